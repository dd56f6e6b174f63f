//! Candidate-position searches.
//!
//! Both searches follow the same shape: generate tiles around a reference
//! point, drop the ones that fail hard filters (walkability, safety distance,
//! line of sight, reachability), score the rest and keep the best.
//!
//! - [`SafePositionSearch`]: weighted scoring, used to escape, buff and
//!   reposition for attacks
//! - [`NovaSearch`]: hit counting under a wall-clock budget, used against
//!   Baal-wave souls
//!
//! # Distance metric
//!
//! Linear scores (`safety * w - travel * w`) use Euclidean tiles so that the
//! weights compare like units. Radius filters and hit counts use exact squared
//! distances.

mod nova;
mod safe;

pub use nova::{NovaPlacement, NovaSearch};
pub use safe::SafePositionSearch;

use game_core::Position;

/// A scored tile produced inside a single search call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub position: Position,
    pub score: f64,
}

impl Candidate {
    pub const fn new(position: Position, score: f64) -> Self {
        Self { position, score }
    }
}

/// Sorts candidates by descending score.
///
/// The sort is stable: equal scores keep generation order.
pub(crate) fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Ring radii from `step` up to and including `max`.
pub(crate) fn radii(max: i32, step: i32) -> Vec<i32> {
    let step = step.max(1);
    let mut radii: Vec<i32> = (1..)
        .map(|i| i * step)
        .take_while(|radius| *radius <= max)
        .collect();
    if max > 0 && radii.last() != Some(&max) {
        radii.push(max);
    }
    radii
}
