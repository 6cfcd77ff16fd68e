//! Fusion product resolution

use crate::nuclide::{Grid, Nuclide};

/// Product of fusing `a` with `b`, or `None` when the product falls
/// outside `grid` and no reaction takes place.
///
/// Rows count protons minus one, so the product row carries an extra one:
/// (z1 + 1) + (z2 + 1) protons sit in row z1 + z2 + 1.
pub fn fusion_product(a: Nuclide, b: Nuclide, grid: Grid) -> Option<Nuclide> {
    let product = Nuclide::new(a.z + b.z + 1, a.n + b.n);
    grid.contains(product).then_some(product)
}
