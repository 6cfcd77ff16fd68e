//! Error types for the nuclide population simulation.
use thiserror::Error;

use crate::nuclide::{DecayRule, Nuclide};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("{grid} has shape {got:?}, expected {expected:?}")] ShapeMismatch { grid: &'static str, got: (usize, usize), expected: (usize, usize) },
    #[error("empty grid: {rows}x{cols}")] EmptyGrid { rows: usize, cols: usize },
    #[error("invalid radius {radius} for row {row}")] InvalidRadius { row: usize, radius: f64 },
    #[error("invalid half-life {seconds}s at {nuclide}")] InvalidHalfLife { nuclide: Nuclide, seconds: f64 },
    #[error("rule {rule:?} at {nuclide} disagrees with its half-life")] RuleHalfLifeMismatch { nuclide: Nuclide, rule: DecayRule },
    #[error("{rule:?} at {nuclide} leaves the chart")] DecayOutOfBounds { nuclide: Nuclide, rule: DecayRule },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("step size must be finite and positive, got {0}")] InvalidStepSize(f64),
    #[error("step count must be positive")] ZeroSteps,
    #[error("{steps} steps exceed the history limit of {max} cells")] HistoryTooLarge { steps: usize, max: usize },
    #[error("no seed populations")] NoSeeds,
    #[error("seed population at {nuclide} must be finite and non-negative, got {count}")] InvalidSeedCount { nuclide: Nuclide, count: f64 },
    #[error("seed {0} is outside the chart")] SeedOutOfBounds(Nuclide),
    #[error("seed {0} listed more than once")] DuplicateSeed(Nuclide),
    #[error("cross-section reference {0} is outside the chart")] ReferenceOutOfBounds(Nuclide),
    #[error("cross-section disk count must be positive")] ZeroDisks,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericalError {
    #[error("population at {nuclide} went negative ({value}) in step {step}")] NegativePopulation { step: usize, nuclide: Nuclide, value: f64 },
    #[error("population at {nuclide} is not finite ({value}) in step {step}")] NonFinite { step: usize, nuclide: Nuclide, value: f64 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("table: {0}")] Table(#[from] TableError),
    #[error("config: {0}")] Config(#[from] ConfigError),
    #[error("numerical: {0}")] Numerical(#[from] NumericalError),
    #[error("simulation already ran {0} steps")] AlreadyComplete(usize),
    #[error("corrupt history: {len} finalised rows of {rows}")] CorruptHistory { len: usize, rows: usize },
    #[error("io: {0}")] Io(#[from] std::io::Error),
    #[error("json: {0}")] Json(#[from] serde_json::Error),
}
