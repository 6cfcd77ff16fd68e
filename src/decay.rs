//! Decay product resolution

use crate::nuclide::{DecayRule, Nuclide};

/// Product of applying `rule` to `nuclide`.
///
/// Only the lower chart edge is checked (coordinates cannot go negative);
/// the upper bounds are the table's concern and are validated when a
/// `NuclideTable` is built.
pub fn decay_product(nuclide: Nuclide, rule: DecayRule) -> Option<Nuclide> {
    let (dz, dn) = rule.shift();
    nuclide.offset(dz, dn)
}
