//! Watches the shared HP history for damage spikes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use defense::EmergencyMonitor;

use crate::events::{EmergencyEvent, Event, EventBus};

pub struct EmergencyWatcher {
    monitor: Arc<EmergencyMonitor>,
    poll_interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
    event_bus: EventBus,
}

impl EmergencyWatcher {
    pub fn new(
        monitor: Arc<EmergencyMonitor>,
        poll_interval: Duration,
        shutdown_rx: watch::Receiver<bool>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            monitor,
            poll_interval,
            shutdown_rx,
            event_bus,
        }
    }

    pub async fn run(mut self) {
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_spike = false;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let spike = self.monitor.has_damage_spike();
                    if spike && !in_spike {
                        let hp_percent = self
                            .monitor
                            .samples()
                            .last()
                            .map_or(0, |sample| sample.hp_percent);
                        tracing::warn!(hp_percent, "damage spike detected");
                        self.event_bus
                            .publish(Event::Emergency(EmergencyEvent::DamageSpike { hp_percent }));
                    }
                    in_spike = spike;
                }
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
