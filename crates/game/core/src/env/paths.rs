use std::time::Duration;

use crate::error::ActionError;
use crate::state::Position;

/// A walkable route returned by the pathfinder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Position>,
    cost: u32,
}

impl Path {
    pub fn new(steps: Vec<Position>, cost: u32) -> Self {
        Self { steps, cost }
    }

    pub fn steps(&self) -> &[Position] {
        &self.steps
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn destination(&self) -> Option<Position> {
        self.steps.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Pathfinding and line-of-sight queries.
pub trait PathFinder: Send + Sync {
    /// Travel distance from the player to `to`.
    fn distance_from_me(&self, to: Position) -> f64;

    fn distance_between(&self, from: Position, to: Position) -> f64 {
        from.distance(to)
    }

    fn line_of_sight(&self, from: Position, to: Position) -> bool;

    /// Path from the player to `to`, ignoring monster collision.
    /// `None` means the destination is unreachable.
    fn path_ignoring_monsters(&self, to: Position) -> Option<Path>;

    fn move_through_path(&self, path: &Path, step_delay: Duration) -> Result<(), ActionError>;
}
