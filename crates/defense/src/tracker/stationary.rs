use std::time::{Duration, Instant};

use game_core::Position;

use crate::config::DefenseConfig;

/// Detects "standing still while losing HP".
///
/// Both conditions are debounced: the player must stay within the movement
/// threshold of the anchor position for `stationary_threshold`, and HP must
/// keep dropping between throttled checks for `damage_threshold`. Movement
/// clears both timers; an HP check without a drop (or while poisoned) clears
/// only the damage timer.
#[derive(Clone, Debug)]
pub struct StationaryDamageDetector {
    movement_threshold: i32,
    stationary_threshold: Duration,
    damage_threshold: Duration,
    hp_check_interval: Duration,
    ignore_poison: bool,

    anchor: Option<Position>,
    stationary_since: Option<Instant>,
    damage_started_at: Option<Instant>,
    last_hp: Option<i32>,
    last_hp_check: Option<Instant>,
}

impl StationaryDamageDetector {
    pub fn new(config: &DefenseConfig) -> Self {
        Self {
            movement_threshold: config.movement_threshold,
            stationary_threshold: config.stationary_threshold(),
            damage_threshold: config.damage_threshold(),
            hp_check_interval: config.hp_check_interval(),
            ignore_poison: config.ignore_poison_damage,
            anchor: None,
            stationary_since: None,
            damage_started_at: None,
            last_hp: None,
            last_hp_check: None,
        }
    }

    pub fn stationary_since(&self) -> Option<Instant> {
        self.stationary_since
    }

    pub fn damage_started_at(&self) -> Option<Instant> {
        self.damage_started_at
    }

    /// Feeds one tick of telemetry. Returns true when the condition fires;
    /// firing resets the detector.
    pub fn is_stationary_and_taking_damage(
        &mut self,
        position: Position,
        hp: i32,
        poisoned: bool,
        now: Instant,
    ) -> bool {
        if self.moved(position) {
            self.restart_at(position, hp);
            return false;
        }
        self.anchor.get_or_insert(position);

        let Some(since) = self.stationary_since else {
            // First still tick only starts the clock.
            self.stationary_since = Some(now);
            self.last_hp = Some(hp);
            self.last_hp_check = Some(now);
            return false;
        };

        if self
            .last_hp_check
            .is_some_and(|checked| now.saturating_duration_since(checked) < self.hp_check_interval)
        {
            return false;
        }
        self.check_hp(hp, poisoned, now);

        if now.saturating_duration_since(since) < self.stationary_threshold {
            return false;
        }

        let sustained = self
            .damage_started_at
            .is_some_and(|started| now.saturating_duration_since(started) >= self.damage_threshold);
        if sustained {
            tracing::debug!(hp, %position, "stationary damage threshold reached");
            self.reset();
        }
        sustained
    }

    /// Clears the timers once the player moved away or healed.
    pub fn reset_tracking_if_normalized(&mut self, position: Position, hp: i32) {
        if self.moved(position) {
            self.restart_at(position, hp);
        } else if self.last_hp.is_some_and(|last| hp > last) {
            self.damage_started_at = None;
            self.last_hp = Some(hp);
        }
    }

    /// Forgets everything except the anchor position.
    pub fn reset(&mut self) {
        self.stationary_since = None;
        self.damage_started_at = None;
        self.last_hp = None;
        self.last_hp_check = None;
    }

    fn moved(&self, position: Position) -> bool {
        self.anchor.is_some_and(|anchor| !anchor.within(position, self.movement_threshold))
    }

    fn restart_at(&mut self, position: Position, hp: i32) {
        self.reset();
        self.anchor = Some(position);
        self.last_hp = Some(hp);
    }

    fn check_hp(&mut self, hp: i32, poisoned: bool, now: Instant) {
        let dropped = self.last_hp.is_some_and(|last| hp < last);
        let poison_blocks = poisoned && self.ignore_poison;

        if dropped && !poison_blocks {
            self.damage_started_at.get_or_insert(now);
        } else {
            self.damage_started_at = None;
        }
        self.last_hp = Some(hp);
        self.last_hp_check = Some(now);
    }
}
