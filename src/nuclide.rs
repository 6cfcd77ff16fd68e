//! Nuclide coordinates on the chart
//!
//! Rows are indexed by proton number minus one (row 0 = hydrogen), columns
//! by neutron count. All grids in the crate share this layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the nuclide chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Nuclide {
    pub z: usize, // Chart row (protons - 1)
    pub n: usize, // Neutron count
}

impl Nuclide {
    pub const fn new(z: usize, n: usize) -> Self {
        Self { z, n }
    }

    /// Number of protons carried by this nuclide
    pub fn protons(&self) -> usize {
        self.z + 1
    }

    /// Mass number A = protons + neutrons
    pub fn nucleons(&self) -> usize {
        self.protons() + self.n
    }

    /// Shift by a signed (dz, dn), `None` if either coordinate would go negative
    pub fn offset(&self, dz: isize, dn: isize) -> Option<Nuclide> {
        Some(Nuclide {
            z: self.z.checked_add_signed(dz)?,
            n: self.n.checked_add_signed(dn)?,
        })
    }

    pub(crate) fn index(&self) -> [usize; 2] {
        [self.z, self.n]
    }
}

impl fmt::Display for Nuclide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.z, self.n)
    }
}

/// Shape of the chart: number of rows and columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
}

impl Grid {
    pub fn contains(&self, nuclide: Nuclide) -> bool {
        nuclide.z < self.rows && nuclide.n < self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Every cell in row-major order
    pub fn cells(self) -> impl Iterator<Item = Nuclide> {
        (0..self.rows).flat_map(move |z| (0..self.cols).map(move |n| Nuclide::new(z, n)))
    }
}

/// Spontaneous transformation governing a nuclide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayRule {
    Stable,
    BetaPlus,        // p -> n
    BetaMinus,       // n -> p
    ProtonEmission,
    NeutronEmission,
    AlphaDecay,
}

impl DecayRule {
    /// Change in (z, n) produced by the rule
    pub fn shift(&self) -> (isize, isize) {
        match self {
            DecayRule::Stable => (0, 0),
            DecayRule::BetaPlus => (-1, 1),
            DecayRule::BetaMinus => (1, -1),
            DecayRule::ProtonEmission => (-1, 0),
            DecayRule::NeutronEmission => (0, -1),
            DecayRule::AlphaDecay => (-2, -2),
        }
    }

    pub fn is_stable(&self) -> bool {
        matches!(self, DecayRule::Stable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nucleons() {
        // Helium-4 sits in row 1, column 2
        let he4 = Nuclide::new(1, 2);
        assert_eq!(he4.protons(), 2);
        assert_eq!(he4.nucleons(), 4);
    }

    #[test]
    fn test_offset_underflow() {
        assert_eq!(Nuclide::new(0, 0).offset(-1, 0), None);
        assert_eq!(Nuclide::new(0, 0).offset(0, -1), None);
        assert_eq!(Nuclide::new(3, 4).offset(-2, -2), Some(Nuclide::new(1, 2)));
    }

    #[test]
    fn test_grid_cells_row_major() {
        let grid = Grid { rows: 2, cols: 3 };
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Nuclide::new(0, 0));
        assert_eq!(cells[3], Nuclide::new(1, 0));
        assert!(grid.contains(Nuclide::new(1, 2)));
        assert!(!grid.contains(Nuclide::new(2, 0)));
        assert!(!grid.contains(Nuclide::new(0, 3)));
    }

    #[test]
    fn test_rule_names() {
        let rule: DecayRule = serde_json::from_str("\"beta_minus\"").unwrap();
        assert_eq!(rule, DecayRule::BetaMinus);
        assert_eq!(serde_json::to_string(&DecayRule::AlphaDecay).unwrap(), "\"alpha_decay\"");
    }
}
