//! Simulation configuration
//!
//! Everything a run needs besides the nuclide table: step size, step count,
//! seed populations and the reference cross-section used to normalise
//! collision rates.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error};
use crate::nuclide::{Grid, Nuclide};
use crate::table::NuclideTable;

/// Defaults of the reference run
pub mod constants {
    pub const STEP_SECONDS: f64 = 0.119;
    pub const STEPS: usize = 1000;
    pub const HYDROGEN_ATOMS: f64 = 1.0e6;
    pub const DEUTERIUM_ATOMS: f64 = 1.0e3;
    /// Cross-section normalisation: this many disks of the reference radius
    pub const REFERENCE_DISKS: u32 = 20;
    /// Largest population history allocated up front (cells of f64)
    pub const MAX_HISTORY_CELLS: usize = 1 << 28;
}

/// Initial population of one nuclide
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Seed {
    pub z: usize,
    pub n: usize,
    pub count: f64,
}

impl Seed {
    pub fn new(nuclide: Nuclide, count: f64) -> Self {
        Self { z: nuclide.z, n: nuclide.n, count }
    }

    pub fn nuclide(&self) -> Nuclide {
        Nuclide::new(self.z, self.n)
    }
}

/// Reference area against which geometric cross-sections are measured
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrossSection {
    pub reference: Nuclide,
    pub disks: u32,
}

impl Default for CrossSection {
    fn default() -> Self {
        Self {
            reference: Nuclide::new(5, 0), // Carbon
            disks: constants::REFERENCE_DISKS,
        }
    }
}

impl CrossSection {
    /// disks * pi * r_ref^2 [m^2]
    pub fn area(&self, table: &NuclideTable) -> f64 {
        let r = table.radius(self.reference);
        self.disks as f64 * PI * r * r
    }
}

/// How outgoing transfers are reconciled with what a cell holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeMode {
    /// Scale a cell's outgoing transfers down to its population
    #[default]
    Limited,
    /// Unthrottled per-pair update; complete decay zeroes the source cell
    Reference,
}

/// What to do when a population goes negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyPolicy {
    /// Zero the cell, warn, and record the anomaly
    #[default]
    Clamp,
    /// Stop the run with an error
    Abort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub step_seconds: f64, // Temporal step size [s]
    pub steps: usize,      // Number of transitions (Nt)
    pub seeds: Vec<Seed>,
    pub cross_section: CrossSection,
    pub fusion_enabled: bool,
    pub exchange: ExchangeMode,
    pub anomaly_policy: AnomalyPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_seconds: constants::STEP_SECONDS,
            steps: constants::STEPS,
            seeds: vec![
                Seed::new(Nuclide::new(0, 0), constants::HYDROGEN_ATOMS),
                Seed::new(Nuclide::new(0, 1), constants::DEUTERIUM_ATOMS),
            ],
            cross_section: CrossSection::default(),
            fusion_enabled: true,
            exchange: ExchangeMode::default(),
            anomaly_policy: AnomalyPolicy::default(),
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Reject anything that would make the run meaningless before it starts
    pub fn validate(&self, grid: Grid) -> Result<(), ConfigError> {
        if !self.step_seconds.is_finite() || self.step_seconds <= 0.0 {
            return Err(ConfigError::InvalidStepSize(self.step_seconds));
        }
        if self.steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        let cells = (self.steps as u128 + 1) * grid.rows as u128 * grid.cols as u128;
        if cells > constants::MAX_HISTORY_CELLS as u128 {
            return Err(ConfigError::HistoryTooLarge {
                steps: self.steps,
                max: constants::MAX_HISTORY_CELLS,
            });
        }
        if self.seeds.is_empty() {
            return Err(ConfigError::NoSeeds);
        }

        let mut seen = HashSet::new();
        for seed in &self.seeds {
            let nuclide = seed.nuclide();
            if !grid.contains(nuclide) {
                return Err(ConfigError::SeedOutOfBounds(nuclide));
            }
            if !seed.count.is_finite() || seed.count < 0.0 {
                return Err(ConfigError::InvalidSeedCount { nuclide, count: seed.count });
            }
            if !seen.insert(nuclide) {
                return Err(ConfigError::DuplicateSeed(nuclide));
            }
        }

        if !grid.contains(self.cross_section.reference) {
            return Err(ConfigError::ReferenceOutOfBounds(self.cross_section.reference));
        }
        if self.cross_section.disks == 0 {
            return Err(ConfigError::ZeroDisks);
        }
        Ok(())
    }
}
