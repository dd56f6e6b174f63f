use thiserror::Error;

/// Invalid [`crate::DefenseConfig`] values.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("{field} must be a percentage, got {value}")]
    PercentOutOfRange { field: &'static str, value: i32 },

    #[error("{field} must be within 1..=180 degrees, got {value}")]
    AngleStep { field: &'static str, value: u32 },

    #[error("min_safe_distance {min} exceeds safe_distance {target}")]
    SafeDistanceOrder { min: i32, target: i32 },

    #[error("{field} must be a finite non-negative weight, got {value}")]
    InvalidWeight { field: &'static str, value: f64 },

    #[error("spike window {spike_window_ms}ms exceeds history window {window_ms}ms")]
    SpikeWindowTooLong {
        spike_window_ms: u64,
        window_ms: u64,
    },
}
