//! Population simulator
//!
//! Owns the population history and advances it one step at a time. Each
//! step reads only the previous row plus the static table:
//!
//! 1. copy row t forward as the starting point of row t+1;
//! 2. collect the active cells (strictly positive population at t);
//! 3. fusion: every ordered pair of active cells whose product stays on the
//!    chart exchanges `min(P_a, P_b) * pi * (r_a + r_b)^2 / area`, half of
//!    it taken from each reactant and half added to the product;
//! 4. decay: every active unstable cell moves `P * rate` to its decay
//!    product, or all of `P` when `rate > 1`;
//! 5. scan row t+1 for numerical anomalies and append it.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{LN_2, PI};

use crate::config::{AnomalyPolicy, ExchangeMode, SimulationConfig};
use crate::error::{Error, NumericalError};
use crate::fusion::fusion_product;
use crate::history::PopulationHistory;
use crate::nuclide::Nuclide;
use crate::table::NuclideTable;

/// Negative values smaller than this fraction of the row total are rounding
const ROUNDING_TOLERANCE: f64 = 1.0e-9;

/// Where the simulator is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Seeded,        // Only t = 0 exists
    Stepping,      // Some but not all steps taken
    Complete,      // All configured steps taken
}

/// A negative population that was clamped to zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub step: usize,
    pub nuclide: Nuclide,
    pub value: f64,
}

/// What happened during one step
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: usize,            // Index of the row just written
    pub active_cells: usize,
    pub fusion_events: usize,
    pub decays: usize,
    pub throttled_cells: usize, // Cells whose outflow was scaled down
    pub anomalies: usize,
}

#[derive(Debug, Clone, Copy)]
struct FusionEvent {
    a: Nuclide,
    b: Nuclide,
    product: Nuclide,
    transfer: f64,
}

#[derive(Debug, Clone, Copy)]
struct DecayMove {
    source: Nuclide,
    product: Nuclide,
    amount: f64,
    complete: bool, // Whole population leaves within the step
}

pub struct PopulationSimulator {
    table: NuclideTable,
    config: SimulationConfig,
    inverse_area: f64,          // 1 / reference cross-section [1/m^2]
    decay_rates: Array2<f64>,   // ln2 * step / half-life, per step
    history: PopulationHistory,
    anomalies: Vec<Anomaly>,
}

impl PopulationSimulator {
    /// Validate the configuration against the table and seed t = 0
    pub fn new(table: NuclideTable, config: SimulationConfig) -> Result<Self, Error> {
        let grid = table.grid();
        config.validate(grid)?;

        let mut initial = Array2::zeros(grid.shape());
        for seed in &config.seeds {
            initial[seed.nuclide().index()] = seed.count;
        }

        let step = config.step_seconds;
        let decay_rates = table.inverse_half_lives().mapv(|h| h * step * LN_2);
        let inverse_area = 1.0 / config.cross_section.area(&table);
        let history = PopulationHistory::new(initial, config.steps, step);

        log::info!(
            "Seeded {} nuclide(s) on a {}x{} chart: {} steps of {} s, exchange {:?}",
            config.seeds.len(),
            grid.rows,
            grid.cols,
            config.steps,
            step,
            config.exchange
        );

        Ok(Self {
            table,
            config,
            inverse_area,
            decay_rates,
            history,
            anomalies: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        if self.history.is_complete() {
            Phase::Complete
        } else if self.history.len() == 1 {
            Phase::Seeded
        } else {
            Phase::Stepping
        }
    }

    /// Number of steps taken so far
    pub fn current_step(&self) -> usize {
        self.history.len() - 1
    }

    pub fn table(&self) -> &NuclideTable {
        &self.table
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn history(&self) -> &PopulationHistory {
        &self.history
    }

    pub fn into_history(self) -> PopulationHistory {
        self.history
    }

    /// Negative populations clamped so far
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Per-step decay rate of `nuclide`
    pub fn decay_rate(&self, nuclide: Nuclide) -> f64 {
        self.decay_rates[nuclide.index()]
    }

    /// Advance the population by one step
    pub fn step(&mut self) -> Result<StepOutcome, Error> {
        if self.history.is_complete() {
            return Err(Error::AlreadyComplete(self.config.steps));
        }
        let step = self.history.len();
        let current = self.history.last().to_owned();
        let mut next = current.clone();

        let active: Vec<Nuclide> = self
            .table
            .grid()
            .cells()
            .filter(|c| current[c.index()] > 0.0)
            .collect();

        let mut events = if self.config.fusion_enabled {
            self.fusion_events(&current, &active)
        } else {
            Vec::new()
        };
        let mut decays = self.decay_moves(&current, &active);

        let throttled_cells = match self.config.exchange {
            ExchangeMode::Limited => limit_outflow(&current, &mut events, &mut decays),
            ExchangeMode::Reference => 0,
        };

        for e in &events {
            let half = e.transfer / 2.0;
            next[e.product.index()] += half;
            next[e.a.index()] -= half;
            next[e.b.index()] -= half;
        }

        for d in &decays {
            next[d.product.index()] += d.amount;
            if d.complete && self.config.exchange == ExchangeMode::Reference {
                next[d.source.index()] = 0.0;
            } else {
                next[d.source.index()] -= d.amount;
            }
        }

        let anomalies = self.check_row(step, &mut next)?;
        self.history.push(&next);

        let outcome = StepOutcome {
            step,
            active_cells: active.len(),
            fusion_events: events.len(),
            decays: decays.len(),
            throttled_cells,
            anomalies,
        };
        log::debug!("{:?}", outcome);
        Ok(outcome)
    }

    /// Step until every configured step has been taken
    pub fn run(&mut self) -> Result<&PopulationHistory, Error> {
        while !self.history.is_complete() {
            self.step()?;
        }
        log::info!(
            "Completed {} steps: {:.6e} atoms remain ({:.6e} at start), {} anomalies",
            self.config.steps,
            self.history.total(self.current_step()).unwrap_or_default(),
            self.history.total(0).unwrap_or_default(),
            self.anomalies.len()
        );
        Ok(&self.history)
    }

    fn fusion_events(&self, current: &Array2<f64>, active: &[Nuclide]) -> Vec<FusionEvent> {
        let grid = self.table.grid();
        let mut events = Vec::new();

        for &a in active {
            for &b in active {
                let Some(product) = fusion_product(a, b, grid) else {
                    continue;
                };
                let r = self.table.radius(a) + self.table.radius(b);
                let transfer =
                    current[a.index()].min(current[b.index()]) * PI * r * r * self.inverse_area;
                events.push(FusionEvent { a, b, product, transfer });
            }
        }
        events
    }

    fn decay_moves(&self, current: &Array2<f64>, active: &[Nuclide]) -> Vec<DecayMove> {
        active
            .iter()
            .filter_map(|&source| {
                let rate = self.decay_rates[source.index()];
                if rate == 0.0 {
                    return None;
                }
                let population = current[source.index()];
                let product = self.table.decay_product(source);
                Some(if rate > 1.0 {
                    DecayMove { source, product, amount: population, complete: true }
                } else {
                    DecayMove { source, product, amount: population * rate, complete: false }
                })
            })
            .collect()
    }

    /// Zero negative cells of a freshly computed row, returning how many
    /// were real anomalies rather than rounding
    fn check_row(&mut self, step: usize, next: &mut Array2<f64>) -> Result<usize, NumericalError> {
        let tolerance = ROUNDING_TOLERANCE * next.iter().filter(|v| **v > 0.0).sum::<f64>();
        let mut found = Vec::new();

        for ((z, n), value) in next.indexed_iter_mut() {
            let nuclide = Nuclide::new(z, n);
            if !value.is_finite() {
                return Err(NumericalError::NonFinite { step, nuclide, value: *value });
            }
            if *value >= 0.0 {
                continue;
            }
            if -*value <= tolerance {
                log::debug!("step {}: rounding residue {:e} at {} zeroed", step, *value, nuclide);
                *value = 0.0;
                continue;
            }
            match self.config.anomaly_policy {
                AnomalyPolicy::Abort => {
                    return Err(NumericalError::NegativePopulation { step, nuclide, value: *value });
                }
                AnomalyPolicy::Clamp => {
                    found.push(Anomaly { step, nuclide, value: *value });
                    *value = 0.0;
                }
            }
        }

        if let Some(worst) = found.iter().min_by(|a, b| a.value.total_cmp(&b.value)) {
            log::warn!(
                "step {}: clamped {} negative population(s), worst {:.4e} at {}",
                step,
                found.len(),
                worst.value,
                self.table.symbol(worst.nuclide)
            );
        }
        let count = found.len();
        self.anomalies.extend(found);
        Ok(count)
    }
}

/// Scale every cell's outgoing transfers so they never exceed what the cell
/// holds at t. A fusion event is limited by the scarcer of its reactants.
/// Returns the number of cells that had to be scaled.
fn limit_outflow(
    current: &Array2<f64>,
    events: &mut [FusionEvent],
    decays: &mut [DecayMove],
) -> usize {
    let mut demand = Array2::<f64>::zeros(current.dim());
    for e in events.iter() {
        demand[e.a.index()] += e.transfer / 2.0;
        demand[e.b.index()] += e.transfer / 2.0;
    }
    for d in decays.iter() {
        demand[d.source.index()] += d.amount;
    }

    let scale = ndarray::Zip::from(current)
        .and(&demand)
        .map_collect(|&held, &wanted| if wanted > held { held / wanted } else { 1.0 });

    for e in events.iter_mut() {
        e.transfer *= scale[e.a.index()].min(scale[e.b.index()]);
    }
    for d in decays.iter_mut() {
        d.amount *= scale[d.source.index()];
    }
    scale.iter().filter(|s| **s < 1.0).count()
}
