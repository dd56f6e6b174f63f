//! Defensive reactions and tactical positioning.
//!
//! The crate turns polled telemetry into debounced danger signals, searches
//! for safe or tactical tiles, and executes one mitigation per tick:
//!
//! - [`tracker`]: stationary-damage and ineffective-attack detectors, HP history
//! - [`search`]: weighted safe/attack position search and the budgeted Nova search
//! - [`policy`]: [`DefenseManager`], the per-tick reaction policy
//! - [`souls`]: Baal-wave soul evasion built on the Nova search
//!
//! Every collaborator comes in through [`game_core::BotEnv`]; nothing here
//! talks to the game client directly.
pub mod config;
pub mod error;
pub mod geometry;
pub mod policy;
pub mod search;
pub mod souls;
pub mod tracker;

pub use config::{DefenseConfig, HpHistoryConfig, NovaConfig, SearchConfig};
pub use error::ConfigError;
pub use policy::{DefenseManager, Reaction, Trigger};
pub use search::{Candidate, NovaPlacement, NovaSearch, SafePositionSearch};
pub use souls::{SoulEvasion, SoulOutcome};
pub use tracker::{
    EmergencyMonitor, HpHistory, HpSample, IneffectiveAttackDetector, StationaryDamageDetector,
};
