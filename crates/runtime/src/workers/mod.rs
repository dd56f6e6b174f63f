//! Worker tasks that back the runtime orchestration.
//!
//! The defense worker owns the single-owner [`defense::DefenseManager`] and
//! runs the tick loop; the emergency watcher only reads the shared HP history.

mod defense;
mod emergency;

pub use defense::{Command, DefenseStats, DefenseWorker};
pub use emergency::EmergencyWatcher;
