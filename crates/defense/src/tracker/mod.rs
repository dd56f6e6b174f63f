//! Debounced danger detectors fed once per tick.
//!
//! Each detector turns noisy polled telemetry into a boolean that only fires
//! after its condition held continuously for a configured duration:
//!
//! ```text
//! Idle ──condition seen──▶ Pending ──duration exceeded──▶ Fired ──▶ Idle
//!   ▲                          │
//!   └──── movement / damage dealt / target switch / poison
//! ```

mod hp_history;
mod ineffective;
mod stationary;

use std::sync::{Arc, Mutex, PoisonError};

use game_core::Clock;

pub use hp_history::{HpHistory, HpSample};
pub use ineffective::IneffectiveAttackDetector;
pub use stationary::StationaryDamageDetector;

use crate::config::HpHistoryConfig;

/// Shared HP history for the emergency-exit watcher.
///
/// The defense tick appends samples while another task may poll for damage
/// spikes, so every access goes through the lock.
pub struct EmergencyMonitor {
    history: Mutex<HpHistory>,
    clock: Arc<dyn Clock>,
    config: HpHistoryConfig,
}

impl EmergencyMonitor {
    pub fn new(clock: Arc<dyn Clock>, config: HpHistoryConfig) -> Self {
        Self {
            history: Mutex::new(HpHistory::from_config(&config)),
            clock,
            config,
        }
    }

    pub fn record(&self, hp_percent: i32) {
        let now = self.clock.now();
        self.lock().record(hp_percent, now);
    }

    /// True when HP dropped by the configured spike threshold within the
    /// spike window.
    pub fn has_damage_spike(&self) -> bool {
        let now = self.clock.now();
        self.lock().has_damage_spike(
            self.config.spike_threshold,
            self.config.spike_window(),
            now,
        )
    }

    pub fn samples(&self) -> Vec<HpSample> {
        self.lock().samples().copied().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HpHistory> {
        // A panicked writer leaves at worst one partial append behind.
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EmergencyMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmergencyMonitor")
            .field("history", &self.history)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
