//! Nucleosynthesis Simulator - Main Entry Point
//!
//! Runs the population simulation from a configuration file and/or flags,
//! optionally writes the full population history as JSON and prints a
//! summary of the final populations.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use nucleosynthesis_lib::{
    AnomalyPolicy, ExchangeMode, NuclideTable, PopulationSimulator, RunSummary, SimulationConfig,
};

/// CLI arguments for the simulator.
#[derive(Debug, Parser)]
#[command(name = "nucleosynthesis")]
#[command(about = "Light nuclide population dynamics under fusion and decay", long_about = None)]
struct Args {
    /// Simulation configuration (JSON); defaults to the reference run.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Nuclide chart (JSON); defaults to the built-in chart.
    #[arg(long)]
    table: Option<PathBuf>,

    /// Number of steps, overriding the configuration.
    #[arg(long)]
    steps: Option<usize>,

    /// Step size in seconds, overriding the configuration.
    #[arg(long)]
    step_seconds: Option<f64>,

    /// How outgoing transfers are reconciled with cell populations.
    #[arg(long, value_enum)]
    exchange: Option<ExchangeMode>,

    /// What to do with negative populations.
    #[arg(long, value_enum)]
    anomaly_policy: Option<AnomalyPolicy>,

    /// Run decay only.
    #[arg(long)]
    no_fusion: bool,

    /// Write the population history to this JSON file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of nuclides listed in the summary.
    #[arg(long, default_value = "10")]
    top: usize,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let table = match &args.table {
        Some(path) => NuclideTable::load(path)
            .with_context(|| format!("failed to load nuclide chart {}", path.display()))?,
        None => NuclideTable::builtin().context("built-in nuclide chart is invalid")?,
    };

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(step_seconds) = args.step_seconds {
        config.step_seconds = step_seconds;
    }
    if let Some(exchange) = args.exchange {
        config.exchange = exchange;
    }
    if let Some(policy) = args.anomaly_policy {
        config.anomaly_policy = policy;
    }
    if args.no_fusion {
        config.fusion_enabled = false;
    }

    let mut simulator = PopulationSimulator::new(table, config).context("invalid simulation setup")?;
    simulator.run().context("simulation failed")?;

    if let Some(path) = &args.output {
        simulator
            .history()
            .write_json(path)
            .with_context(|| format!("failed to write history to {}", path.display()))?;
        log::info!("Population history written to {}", path.display());
    }

    let summary = RunSummary::new(
        simulator.table(),
        simulator.history(),
        simulator.anomalies().len(),
        args.top,
    );
    print!("{summary}");
    Ok(())
}
