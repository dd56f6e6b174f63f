//! Async driver for the defense policy.
//!
//! [`Runtime`] spawns a defense worker that ticks the
//! [`defense::DefenseManager`] on a fixed interval and an emergency watcher
//! that polls the shared HP history for damage spikes. Clients interact with
//! both through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder and configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{DefenseEvent, EmergencyEvent, Event, EventBus, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use workers::DefenseStats;
