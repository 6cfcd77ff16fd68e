//! Run summary for the command line

use serde::Serialize;
use std::fmt;

use crate::history::PopulationHistory;
use crate::nuclide::Nuclide;
use crate::table::NuclideTable;

/// Final population of one nuclide
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NuclideShare {
    pub symbol: String,
    pub nuclide: Nuclide,
    pub count: f64,
    pub fraction: f64, // Of the final total
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub steps: usize,
    pub simulated_seconds: f64,
    pub initial_total: f64,
    pub final_total: f64,
    pub initial_nucleons: f64,
    pub final_nucleons: f64,
    pub anomalies: usize,
    pub populations: Vec<NuclideShare>, // Largest first
}

impl RunSummary {
    /// Summarise the last finalised row, keeping the `top` largest populations
    pub fn new(table: &NuclideTable, history: &PopulationHistory, anomalies: usize, top: usize) -> Self {
        let last = history.len() - 1;
        let final_row = history.last();
        let final_total = final_row.sum();

        let mut populations: Vec<NuclideShare> = final_row
            .indexed_iter()
            .filter(|(_, count)| **count > 0.0)
            .map(|((z, n), &count)| {
                let nuclide = Nuclide::new(z, n);
                NuclideShare {
                    symbol: table.symbol(nuclide),
                    nuclide,
                    count,
                    fraction: if final_total > 0.0 { count / final_total } else { 0.0 },
                }
            })
            .collect();
        populations.sort_by(|a, b| b.count.total_cmp(&a.count));
        populations.truncate(top);

        Self {
            steps: last,
            simulated_seconds: history.time(last),
            initial_total: history.total(0).unwrap_or_default(),
            final_total,
            initial_nucleons: history.nucleon_mass(0).unwrap_or_default(),
            final_nucleons: history.nucleon_mass(last).unwrap_or_default(),
            anomalies,
            populations,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Steps:      {} ({:.3} s simulated)", self.steps, self.simulated_seconds)?;
        writeln!(f, "Atoms:      {:.6e} -> {:.6e}", self.initial_total, self.final_total)?;
        writeln!(f, "Nucleons:   {:.6e} -> {:.6e}", self.initial_nucleons, self.final_nucleons)?;
        writeln!(f, "Anomalies:  {}", self.anomalies)?;
        writeln!(f, "{:<8} {:>14} {:>10}", "Nuclide", "Count", "Share")?;
        for share in &self.populations {
            writeln!(
                f,
                "{:<8} {:>14.6e} {:>9.4}%",
                share.symbol,
                share.count,
                share.fraction * 100.0
            )?;
        }
        Ok(())
    }
}
