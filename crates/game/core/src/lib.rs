//! Live game snapshot types and collaborator seams shared by the bot crates.
//!
//! `game-core` does not decide anything. It describes what the decision layers
//! read (player position, HP, monsters, walkability) and the commands they may
//! issue (move, teleport, escape, drink a potion). Concrete implementations
//! live outside this workspace (memory readers, input injection); the
//! [`mock`] module provides in-memory stand-ins for tests and simulation.
//!
//! - [`state`] holds the plain data types read each tick
//! - [`env`] holds the collaborator traits and the [`BotEnv`] bundle
//! - [`poll`] replaces ad hoc sleep loops with a deadline-bounded helper
pub mod env;
pub mod error;
pub mod poll;
pub mod state;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use env::{
    ActionLayer, BeltManager, BotEnv, Character, Clock, GameView, LevelingBehavior, Path,
    PathFinder, SystemClock,
};
pub use error::{ActionError, ErrorSeverity};
pub use poll::{PollTimeout, poll_until};
pub use state::{GameObject, Monster, MonsterFilter, MonsterFlags, PotionKind, Position, UnitId};
