use std::time::{Duration, Instant};

use game_core::{Monster, Position, UnitId};

use crate::config::DefenseConfig;
use crate::geometry::nearest_living;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TrackedTarget {
    id: UnitId,
    life: i32,
    checked_at: Instant,
}

/// Detects attacking the same target for too long without hurting it.
///
/// The target is the nearest living monster within the engagement radius. A
/// new target always starts a fresh baseline, so acquisition never fires.
#[derive(Clone, Debug)]
pub struct IneffectiveAttackDetector {
    engagement_radius: i32,
    threshold: Duration,
    check_interval: Duration,

    target: Option<TrackedTarget>,
    ineffective_since: Option<Instant>,
}

impl IneffectiveAttackDetector {
    pub fn new(config: &DefenseConfig) -> Self {
        Self {
            engagement_radius: config.engagement_radius,
            threshold: config.ineffective_attack_threshold(),
            check_interval: config.target_check_interval(),
            target: None,
            ineffective_since: None,
        }
    }

    pub fn tracked_target(&self) -> Option<UnitId> {
        self.target.map(|target| target.id)
    }

    pub fn ineffective_since(&self) -> Option<Instant> {
        self.ineffective_since
    }

    /// Feeds one tick. Returns true once the tracked target has gone without
    /// losing life for the threshold; firing resets the detector.
    pub fn is_attacking_ineffectively(
        &mut self,
        player: Position,
        monsters: &[Monster],
        now: Instant,
    ) -> bool {
        let radius_squared = i64::from(self.engagement_radius).pow(2);
        let current = nearest_living(player, monsters)
            .filter(|(_, distance)| *distance <= radius_squared)
            .map(|(monster, _)| *monster);

        let Some(current) = current else {
            self.reset();
            return false;
        };

        if !self.target.is_some_and(|tracked| tracked.id == current.id) {
            tracing::debug!(target = %current.id, life = current.life, "new attack target");
            self.target = Some(TrackedTarget {
                id: current.id,
                life: current.life,
                checked_at: now,
            });
            self.ineffective_since = Some(now);
            return false;
        }
        let Some(tracked) = self.target.as_mut() else {
            return false;
        };

        if now.saturating_duration_since(tracked.checked_at) < self.check_interval {
            return false;
        }

        let damaged = current.life < tracked.life;
        tracked.life = current.life;
        tracked.checked_at = now;
        if damaged {
            self.ineffective_since = Some(now);
            return false;
        }

        let stalled = self
            .ineffective_since
            .is_some_and(|since| now.saturating_duration_since(since) >= self.threshold);
        if stalled {
            tracing::debug!(target = %current.id, life = current.life, "target is not taking damage");
            self.reset();
        }
        stalled
    }

    pub fn reset(&mut self) {
        self.target = None;
        self.ineffective_since = None;
    }
}
