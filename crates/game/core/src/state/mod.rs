//! Snapshot data read from the game client each tick.
//!
//! Nothing in here is persisted across ticks: monsters are re-read on every
//! poll and positions are passed by value.
mod common;
mod items;
mod monster;
mod object;

pub use common::{Position, UnitId};
pub use items::PotionKind;
pub use monster::{Monster, MonsterFilter, MonsterFlags};
pub use object::GameObject;
