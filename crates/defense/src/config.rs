//! Tunable thresholds for detection, search and reactions.
//!
//! All durations are stored in milliseconds so the structs stay trivially
//! serializable and can be overridden from plain environment variables.
use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Thresholds driving the danger detectors and the reaction policy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DefenseConfig {
    pub enabled: bool,
    /// How long the player must stand still before damage is considered.
    pub stationary_threshold_ms: u64,
    /// How long HP must keep dropping while stationary before reacting.
    pub damage_threshold_ms: u64,
    /// How long the current target may go without losing HP.
    pub ineffective_attack_threshold_ms: u64,
    /// Tiles the player must move to count as moving.
    pub movement_threshold: i32,
    /// Radius in which the nearest living monster becomes the tracked target.
    pub engagement_radius: i32,
    /// HP percent at or below which only aggressive reactions are used.
    pub low_hp_threshold: i32,
    /// A monster closer than this makes repositioning worthwhile.
    pub danger_distance: i32,
    /// Fallback attack range when the character has no leveling range.
    pub attack_range: i32,
    /// Minimum time between two executed reactions.
    pub action_cooldown_ms: u64,
    /// Poison ticks never count as positional damage.
    pub ignore_poison_damage: bool,
    pub hp_check_interval_ms: u64,
    pub target_check_interval_ms: u64,
    pub history: HpHistoryConfig,
    pub search: SearchConfig,
    pub nova: NovaConfig,
}

impl DefenseConfig {
    pub fn stationary_threshold(&self) -> Duration {
        Duration::from_millis(self.stationary_threshold_ms)
    }

    pub fn damage_threshold(&self) -> Duration {
        Duration::from_millis(self.damage_threshold_ms)
    }

    pub fn ineffective_attack_threshold(&self) -> Duration {
        Duration::from_millis(self.ineffective_attack_threshold_ms)
    }

    pub fn action_cooldown(&self) -> Duration {
        Duration::from_millis(self.action_cooldown_ms)
    }

    pub fn hp_check_interval(&self) -> Duration {
        Duration::from_millis(self.hp_check_interval_ms)
    }

    pub fn target_check_interval(&self) -> Duration {
        Duration::from_millis(self.target_check_interval_ms)
    }

    /// Default configuration with overrides from process environment variables.
    ///
    /// Environment variables:
    /// - `DEFENSE_ENABLED` - Master switch (default: true)
    /// - `DEFENSE_STATIONARY_MS` - Stationary threshold (default: 1500)
    /// - `DEFENSE_DAMAGE_MS` - Damage threshold (default: 1000)
    /// - `DEFENSE_INEFFECTIVE_MS` - Ineffective attack threshold (default: 4000)
    /// - `DEFENSE_LOW_HP` - Low HP percent (default: 35)
    /// - `DEFENSE_DANGER_DISTANCE` - Danger distance in tiles (default: 10)
    /// - `DEFENSE_ATTACK_RANGE` - Fallback attack range (default: 8)
    /// - `DEFENSE_COOLDOWN_MS` - Cooldown between reactions (default: 1500)
    /// - `DEFENSE_MIN_SAFE_DISTANCE` - Hard minimum safety distance (default: 8)
    /// - `NOVA_BUDGET_MS` - Soul search budget (default: 50)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(enabled) = read_env::<bool>("DEFENSE_ENABLED") {
            config.enabled = enabled;
        }
        if let Some(ms) = read_env::<u64>("DEFENSE_STATIONARY_MS") {
            config.stationary_threshold_ms = ms;
        }
        if let Some(ms) = read_env::<u64>("DEFENSE_DAMAGE_MS") {
            config.damage_threshold_ms = ms;
        }
        if let Some(ms) = read_env::<u64>("DEFENSE_INEFFECTIVE_MS") {
            config.ineffective_attack_threshold_ms = ms;
        }
        if let Some(hp) = read_env::<i32>("DEFENSE_LOW_HP") {
            config.low_hp_threshold = hp.clamp(0, 100);
        }
        if let Some(distance) = read_env::<i32>("DEFENSE_DANGER_DISTANCE") {
            config.danger_distance = distance.max(1);
        }
        if let Some(range) = read_env::<i32>("DEFENSE_ATTACK_RANGE") {
            config.attack_range = range.max(1);
        }
        if let Some(ms) = read_env::<u64>("DEFENSE_COOLDOWN_MS") {
            config.action_cooldown_ms = ms;
        }
        if let Some(distance) = read_env::<i32>("DEFENSE_MIN_SAFE_DISTANCE") {
            config.search.min_safe_distance = distance.max(0);
        }
        if let Some(ms) = read_env::<u64>("NOVA_BUDGET_MS") {
            config.nova.budget_ms = ms.max(1);
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.movement_threshold <= 0 {
            return Err(ConfigError::NonPositive("movement_threshold"));
        }
        if self.engagement_radius <= 0 {
            return Err(ConfigError::NonPositive("engagement_radius"));
        }
        if self.attack_range <= 0 {
            return Err(ConfigError::NonPositive("attack_range"));
        }
        if !(0..=100).contains(&self.low_hp_threshold) {
            return Err(ConfigError::PercentOutOfRange {
                field: "low_hp_threshold",
                value: self.low_hp_threshold,
            });
        }
        self.history.validate()?;
        self.search.validate()?;
        self.nova.validate()
    }
}

impl Default for DefenseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stationary_threshold_ms: 1500,
            damage_threshold_ms: 1000,
            ineffective_attack_threshold_ms: 4000,
            movement_threshold: 5,
            engagement_radius: 10,
            low_hp_threshold: 35,
            danger_distance: 10,
            attack_range: 8,
            action_cooldown_ms: 1500,
            ignore_poison_damage: true,
            hp_check_interval_ms: 100,
            target_check_interval_ms: 200,
            history: HpHistoryConfig::default(),
            search: SearchConfig::default(),
            nova: NovaConfig::default(),
        }
    }
}

/// Rolling HP sample buffer used by the emergency monitor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct HpHistoryConfig {
    pub capacity: usize,
    pub window_ms: u64,
    /// HP percent lost within `spike_window_ms` that counts as a spike.
    pub spike_threshold: i32,
    pub spike_window_ms: u64,
}

impl HpHistoryConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn spike_window(&self) -> Duration {
        Duration::from_millis(self.spike_window_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::NonPositive("history.capacity"));
        }
        if self.window_ms == 0 {
            return Err(ConfigError::NonPositive("history.window_ms"));
        }
        if self.spike_window_ms > self.window_ms {
            return Err(ConfigError::SpikeWindowTooLong {
                spike_window_ms: self.spike_window_ms,
                window_ms: self.window_ms,
            });
        }
        Ok(())
    }
}

impl Default for HpHistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            window_ms: 5000,
            spike_threshold: 15,
            spike_window_ms: 2000,
        }
    }
}

/// Candidate generation and scoring weights for the safe-position searches.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SearchConfig {
    /// Candidates closer than this to any living monster are discarded.
    pub min_safe_distance: i32,
    /// Distance at which a buff position earns the safety bonus.
    pub safe_distance: i32,
    pub max_radius: i32,
    pub radius_step: i32,
    pub angle_step_degrees: u32,
    /// Finer ring step used when looking for a buff position.
    pub buff_angle_step_degrees: u32,
    /// Rotation applied around the threat-opposite direction.
    pub jitter_degrees: u32,
    pub safety_weight: f64,
    pub travel_weight: f64,
    pub buff_safe_bonus: f64,
    /// Penalty per tile away from the ideal attack range.
    pub range_weight: f64,
}

impl SearchConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.radius_step <= 0 {
            return Err(ConfigError::NonPositive("search.radius_step"));
        }
        if self.max_radius < self.radius_step {
            return Err(ConfigError::NonPositive("search.max_radius"));
        }
        for (field, step) in [
            ("search.angle_step_degrees", self.angle_step_degrees),
            ("search.buff_angle_step_degrees", self.buff_angle_step_degrees),
        ] {
            if step == 0 || step > 180 {
                return Err(ConfigError::AngleStep { field, value: step });
            }
        }
        if self.min_safe_distance > self.safe_distance {
            return Err(ConfigError::SafeDistanceOrder {
                min: self.min_safe_distance,
                target: self.safe_distance,
            });
        }
        for (field, weight) in [
            ("search.safety_weight", self.safety_weight),
            ("search.travel_weight", self.travel_weight),
            ("search.buff_safe_bonus", self.buff_safe_bonus),
            ("search.range_weight", self.range_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight { field, value: weight });
            }
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_safe_distance: 8,
            safe_distance: 15,
            max_radius: 20,
            radius_step: 2,
            angle_step_degrees: 15,
            buff_angle_step_degrees: 5,
            jitter_degrees: 15,
            safety_weight: 2.0,
            travel_weight: 1.0,
            buff_safe_bonus: 10.0,
            range_weight: 1.5,
        }
    }
}

/// Time-budgeted Nova placement against Baal-wave souls.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NovaConfig {
    pub nova_radius: i32,
    /// Hits at the current position that make moving unnecessary.
    pub min_hits: usize,
    /// Upper bound on hits after which the scan stops early.
    pub good_enough_cap: usize,
    pub search_radius: i32,
    pub grid_step: i32,
    pub budget_ms: u64,
}

impl NovaConfig {
    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.nova_radius <= 0 {
            return Err(ConfigError::NonPositive("nova.nova_radius"));
        }
        if self.grid_step <= 0 {
            return Err(ConfigError::NonPositive("nova.grid_step"));
        }
        if self.search_radius < 0 {
            return Err(ConfigError::NonPositive("nova.search_radius"));
        }
        if self.budget_ms == 0 {
            return Err(ConfigError::NonPositive("nova.budget_ms"));
        }
        if self.min_hits == 0 || self.good_enough_cap == 0 {
            return Err(ConfigError::NonPositive("nova.min_hits"));
        }
        Ok(())
    }
}

impl Default for NovaConfig {
    fn default() -> Self {
        Self {
            nova_radius: 8,
            min_hits: 2,
            good_enough_cap: 5,
            search_radius: 10,
            grid_step: 2,
            budget_ms: 50,
        }
    }
}

/// Parses an environment variable, treating unset or malformed values as absent.
pub fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
