use defense::{Reaction, SoulOutcome};

/// Outcome of a defense tick that did something.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefenseEvent {
    Reaction { tick: u64, reaction: Reaction },
    Souls { tick: u64, outcome: SoulOutcome },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmergencyEvent {
    /// HP dropped by the spike threshold within the spike window. Published
    /// once per spike, on the rising edge.
    DamageSpike { hp_percent: i32 },
}
