//! Nucleosynthesis Simulator Library
//!
//! Discrete-time population dynamics of the light nuclides, hydrogen through
//! carbon with up to six neutrons, under geometric fusion and radioactive
//! decay. The nuclide table is a swappable data asset; the simulator owns the
//! append-only population history that the run produces.

pub mod config;
pub mod decay;
pub mod error;
pub mod fusion;
pub mod history;
pub mod nuclide;
pub mod report;
pub mod simulator;
pub mod table;

pub use config::{AnomalyPolicy, CrossSection, ExchangeMode, Seed, SimulationConfig};
pub use decay::decay_product;
pub use error::{ConfigError, Error, NumericalError, TableError};
pub use fusion::fusion_product;
pub use history::PopulationHistory;
pub use nuclide::{DecayRule, Grid, Nuclide};
pub use report::RunSummary;
pub use simulator::{Anomaly, Phase, PopulationSimulator, StepOutcome};
pub use table::{HalfLife, NuclideTable, TableMetadata};
