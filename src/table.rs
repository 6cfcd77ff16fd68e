//! Nuclide table
//!
//! Decay rules, effective radii and inverse half-lives for every cell of the
//! chart, loaded from a versioned JSON data asset. The shipped chart is
//! embedded at compile time; any other chart with the same layout can be
//! loaded from disk instead.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::decay::decay_product;
use crate::error::{Error, TableError};
use crate::nuclide::{DecayRule, Grid, Nuclide};

/// Chart shipped with the crate
const BUILTIN_CHART: &str = include_str!("../config/nuclide_chart.json");

/// Picometres to metres
const PM: f64 = 1.0e-12;

/// Provenance of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub version: String,
    pub source: String,
    pub elements: Vec<String>, // Symbol per row
    pub grid: Grid,
}

/// Half-life entry of the data asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfLife {
    Stable,
    /// Gone within a single step whatever the step size
    Prompt,
    Seconds(f64),
}

impl HalfLife {
    /// Inverse half-life [1/s]
    pub fn inverse(&self) -> f64 {
        match self {
            HalfLife::Stable => 0.0,
            HalfLife::Prompt => f64::INFINITY,
            HalfLife::Seconds(s) => 1.0 / s,
        }
    }
}

/// On-disk layout of a chart
#[derive(Debug, Clone, Deserialize)]
struct ChartFile {
    metadata: TableMetadata,
    rules: Vec<Vec<DecayRule>>,
    radii_pm: Vec<f64>,
    half_lives: Vec<Vec<HalfLife>>,
}

/// Immutable per-nuclide data, validated on construction
#[derive(Debug, Clone)]
pub struct NuclideTable {
    metadata: TableMetadata,
    rules: Array2<DecayRule>,
    radii: Array2<f64>,             // [m]
    inverse_half_lives: Array2<f64>, // [1/s]
    products: Array2<Nuclide>,
}

fn grid_from_rows<T: Clone>(
    name: &'static str,
    rows: Vec<Vec<T>>,
    grid: Grid,
) -> Result<Array2<T>, TableError> {
    let mismatch = |got| TableError::ShapeMismatch { grid: name, got, expected: grid.shape() };
    if rows.len() != grid.rows {
        let cols = rows.first().map_or(0, Vec::len);
        return Err(mismatch((rows.len(), cols)));
    }
    if let Some(row) = rows.iter().find(|row| row.len() != grid.cols) {
        return Err(mismatch((grid.rows, row.len())));
    }
    let flat: Vec<T> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec(grid.shape(), flat).map_err(|_| mismatch(grid.shape()))
}

fn check_shape<T>(name: &'static str, array: &Array2<T>, grid: Grid) -> Result<(), TableError> {
    if array.dim() != grid.shape() {
        return Err(TableError::ShapeMismatch { grid: name, got: array.dim(), expected: grid.shape() });
    }
    Ok(())
}

impl NuclideTable {
    /// Build and validate a table from its three grids
    pub fn new(
        metadata: TableMetadata,
        rules: Array2<DecayRule>,
        radii: Array2<f64>,
        half_lives: Array2<HalfLife>,
    ) -> Result<Self, TableError> {
        let grid = metadata.grid;
        if grid.rows == 0 || grid.cols == 0 {
            return Err(TableError::EmptyGrid { rows: grid.rows, cols: grid.cols });
        }
        if metadata.elements.len() != grid.rows {
            return Err(TableError::ShapeMismatch {
                grid: "elements",
                got: (metadata.elements.len(), 1),
                expected: (grid.rows, 1),
            });
        }
        check_shape("rules", &rules, grid)?;
        check_shape("radii", &radii, grid)?;
        check_shape("half_lives", &half_lives, grid)?;

        let mut inverse_half_lives = Array2::zeros(grid.shape());
        let mut products = Array2::from_elem(grid.shape(), Nuclide::new(0, 0));

        for nuclide in grid.cells() {
            let idx = nuclide.index();

            let radius = radii[idx];
            if !radius.is_finite() || radius <= 0.0 {
                return Err(TableError::InvalidRadius { row: nuclide.z, radius });
            }

            let half_life = half_lives[idx];
            if let HalfLife::Seconds(seconds) = half_life {
                // Zero would be prompt; say so explicitly
                if !seconds.is_finite() || seconds <= 0.0 {
                    return Err(TableError::InvalidHalfLife { nuclide, seconds });
                }
            }

            let rule = rules[idx];
            if rule.is_stable() != (half_life == HalfLife::Stable) {
                return Err(TableError::RuleHalfLifeMismatch { nuclide, rule });
            }

            let product = decay_product(nuclide, rule)
                .filter(|p| grid.contains(*p))
                .ok_or(TableError::DecayOutOfBounds { nuclide, rule })?;

            inverse_half_lives[idx] = half_life.inverse();
            products[idx] = product;
        }

        Ok(Self { metadata, rules, radii, inverse_half_lives, products })
    }

    /// The chart shipped with the crate
    pub fn builtin() -> Result<Self, Error> {
        Self::from_json_str(BUILTIN_CHART)
    }

    /// Load a chart from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, Error> {
        let file: ChartFile = serde_json::from_str(content)?;
        let grid = file.metadata.grid;

        if file.radii_pm.len() != grid.rows {
            return Err(TableError::ShapeMismatch {
                grid: "radii_pm",
                got: (file.radii_pm.len(), 1),
                expected: (grid.rows, 1),
            }
            .into());
        }
        // One radius per element, shared by all of its isotopes
        let radii = Array2::from_shape_fn(grid.shape(), |(z, _)| file.radii_pm[z] * PM);
        let rules = grid_from_rows("rules", file.rules, grid)?;
        let half_lives = grid_from_rows("half_lives", file.half_lives, grid)?;

        let table = Self::new(file.metadata, rules, radii, half_lives)?;
        log::info!(
            "Loaded nuclide chart v{} ({}x{}) from {}",
            table.metadata.version,
            grid.rows,
            grid.cols,
            table.metadata.source
        );
        Ok(table)
    }

    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    pub fn grid(&self) -> Grid {
        self.metadata.grid
    }

    pub fn rule(&self, nuclide: Nuclide) -> DecayRule {
        self.rules[nuclide.index()]
    }

    /// Effective atomic radius [m]
    pub fn radius(&self, nuclide: Nuclide) -> f64 {
        self.radii[nuclide.index()]
    }

    /// 1 / half-life [1/s]; zero for stable nuclides, infinite for prompt ones
    pub fn inverse_half_life(&self, nuclide: Nuclide) -> f64 {
        self.inverse_half_lives[nuclide.index()]
    }

    /// Where `nuclide` decays to; itself when stable
    pub fn decay_product(&self, nuclide: Nuclide) -> Nuclide {
        self.products[nuclide.index()]
    }

    pub fn inverse_half_lives(&self) -> &Array2<f64> {
        &self.inverse_half_lives
    }

    /// Human readable name such as "He-4"
    pub fn symbol(&self, nuclide: Nuclide) -> String {
        match self.metadata.elements.get(nuclide.z) {
            Some(element) => format!("{}-{}", element, nuclide.nucleons()),
            None => format!("Z{}-{}", nuclide.protons(), nuclide.nucleons()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn small_metadata() -> TableMetadata {
        TableMetadata {
            version: "test".into(),
            source: "unit test".into(),
            elements: vec!["H".into(), "He".into()],
            grid: Grid { rows: 2, cols: 2 },
        }
    }

    fn small_parts() -> (Array2<DecayRule>, Array2<f64>, Array2<HalfLife>) {
        let rules = ndarray::arr2(&[
            [DecayRule::Stable, DecayRule::Stable],
            [DecayRule::BetaPlus, DecayRule::Stable],
        ]);
        let radii = Array2::from_elem((2, 2), 50.0 * PM);
        let half_lives = ndarray::arr2(&[
            [HalfLife::Stable, HalfLife::Stable],
            [HalfLife::Prompt, HalfLife::Stable],
        ]);
        (rules, radii, half_lives)
    }

    #[test]
    fn test_builtin_chart() {
        let table = NuclideTable::builtin().unwrap();
        assert_eq!(table.grid(), Grid { rows: 6, cols: 7 });
        assert_eq!(table.rule(Nuclide::new(0, 2)), DecayRule::BetaMinus);
        assert_eq!(table.decay_product(Nuclide::new(0, 2)), Nuclide::new(1, 1));
        assert_eq!(table.decay_product(Nuclide::new(3, 4)), Nuclide::new(1, 2));
        assert_eq!(table.inverse_half_life(Nuclide::new(0, 0)), 0.0);
        assert!(table.inverse_half_life(Nuclide::new(1, 0)).is_infinite());
        assert!((table.inverse_half_life(Nuclide::new(1, 6)) - 1.0 / 0.119).abs() < 1e-9);
        assert!((table.radius(Nuclide::new(5, 3)) - 67.0e-12).abs() < 1e-24);
        assert_eq!(table.symbol(Nuclide::new(1, 2)), "He-4");
        assert_eq!(table.symbol(Nuclide::new(5, 6)), "C-12");
    }

    #[test]
    fn test_builtin_stable_cells_have_zero_rate() {
        let table = NuclideTable::builtin().unwrap();
        for nuclide in table.grid().cells() {
            if table.rule(nuclide).is_stable() {
                assert_eq!(table.inverse_half_life(nuclide), 0.0, "{nuclide}");
                assert_eq!(table.decay_product(nuclide), nuclide);
            } else {
                assert!(table.inverse_half_life(nuclide) > 0.0, "{nuclide}");
                assert_ne!(table.decay_product(nuclide), nuclide);
            }
        }
    }

    #[test]
    fn test_new_small_table() {
        let (rules, radii, half_lives) = small_parts();
        let table = NuclideTable::new(small_metadata(), rules, radii, half_lives).unwrap();
        assert_eq!(table.decay_product(Nuclide::new(1, 0)), Nuclide::new(0, 1));
    }

    #[test]
    fn test_decay_out_of_bounds() {
        let (mut rules, radii, mut half_lives) = small_parts();
        // He-3 beta plus needs a third column
        rules[[1, 1]] = DecayRule::BetaPlus;
        half_lives[[1, 1]] = HalfLife::Seconds(1.0);
        let err = NuclideTable::new(small_metadata(), rules, radii, half_lives).unwrap_err();
        assert_eq!(
            err,
            TableError::DecayOutOfBounds { nuclide: Nuclide::new(1, 1), rule: DecayRule::BetaPlus }
        );
    }

    #[test]
    fn test_decay_below_origin() {
        let (mut rules, radii, mut half_lives) = small_parts();
        rules[[0, 0]] = DecayRule::ProtonEmission;
        half_lives[[0, 0]] = HalfLife::Prompt;
        let err = NuclideTable::new(small_metadata(), rules, radii, half_lives).unwrap_err();
        assert!(matches!(err, TableError::DecayOutOfBounds { .. }));
    }

    #[test]
    fn test_rule_half_life_mismatch() {
        let (rules, radii, mut half_lives) = small_parts();
        half_lives[[0, 1]] = HalfLife::Seconds(10.0);
        let err = NuclideTable::new(small_metadata(), rules, radii, half_lives).unwrap_err();
        assert_eq!(
            err,
            TableError::RuleHalfLifeMismatch { nuclide: Nuclide::new(0, 1), rule: DecayRule::Stable }
        );
    }

    #[test]
    fn test_invalid_radius_and_half_life() {
        let (rules, mut radii, half_lives) = small_parts();
        radii[[1, 0]] = 0.0;
        let err = NuclideTable::new(small_metadata(), rules.clone(), radii, half_lives).unwrap_err();
        assert!(matches!(err, TableError::InvalidRadius { row: 1, .. }));

        let (_, radii, mut half_lives) = small_parts();
        half_lives[[1, 0]] = HalfLife::Seconds(-1.0);
        let err = NuclideTable::new(small_metadata(), rules, radii, half_lives).unwrap_err();
        assert!(matches!(err, TableError::InvalidHalfLife { .. }));
    }

    #[test]
    fn test_shape_mismatch() {
        let (rules, radii, half_lives) = small_parts();
        let mut metadata = small_metadata();
        metadata.grid = Grid { rows: 2, cols: 3 };
        metadata.elements = vec!["H".into(), "He".into()];
        let err = NuclideTable::new(metadata, rules, radii, half_lives).unwrap_err();
        assert!(matches!(err, TableError::ShapeMismatch { grid: "rules", .. }));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let json = BUILTIN_CHART.replacen(
            "\"stable\", \"stable\", \"beta_minus\",",
            "\"stable\", \"beta_minus\",",
            1,
        );
        let err = NuclideTable::from_json_str(&json).unwrap_err();
        assert!(matches!(err, Error::Table(TableError::ShapeMismatch { grid: "rules", .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BUILTIN_CHART.as_bytes()).unwrap();
        let table = NuclideTable::load(file.path()).unwrap();
        assert_eq!(table.metadata().elements.len(), 6);
    }

    #[test]
    fn test_load_missing_file() {
        let err = NuclideTable::load("/nonexistent/chart.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
