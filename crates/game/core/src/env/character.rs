/// Extra behavior exposed by characters built for leveling runs.
pub trait LevelingBehavior: Send + Sync {
    /// Preferred engagement range in tiles while leveling.
    fn attack_range(&self) -> i32;
}

/// Build-specific character capabilities.
///
/// Optional behavior is exposed through accessor methods that return `None`
/// when a build does not support it, instead of downcasting at runtime.
pub trait Character: Send + Sync {
    fn can_teleport(&self) -> bool;

    fn leveling(&self) -> Option<&dyn LevelingBehavior> {
        None
    }
}
