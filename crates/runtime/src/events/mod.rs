//! Topic-based event bus for runtime events.
//!
//! Events are published to a topic and consumers subscribe only to the topics
//! they need. Delivery is best-effort: lagging receivers lose old events.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{DefenseEvent, EmergencyEvent};
