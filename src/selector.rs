// Move selector
//
// Uniform choice among the surviving candidates. The random source is
// supplied by the caller so tests can seed it.

use rand::Rng;

use crate::types::Direction;

/// Returns the only candidate directly, otherwise draws one uniformly.
/// `None` only for an empty slice.
pub fn select<R: Rng>(candidates: &[Direction], rng: &mut R) -> Option<Direction> {
    match candidates {
        [] => None,
        [only] => Some(*only),
        _ => Some(candidates[rng.random_range(0..candidates.len())]),
    }
}
