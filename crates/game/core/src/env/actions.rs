use crate::error::ActionError;
use crate::state::{MonsterFilter, Position, UnitId};

/// Commands that drive the character through the game client.
///
/// Every command is synchronous: it returns once the client reports the
/// command finished (or failed).
pub trait ActionLayer: Send + Sync {
    fn move_to(&self, to: Position) -> Result<(), ActionError>;

    /// Blink to `to`. Callers check [`super::Character::can_teleport`] first.
    fn teleport_to(&self, to: Position) -> Result<(), ActionError>;

    /// Character-specific reactive dodge used when no good destination exists.
    fn escape(&self) -> Result<(), ActionError>;

    /// Interacts with a world object (portal, shrine, seal) until `is_done`
    /// reports success or the client gives up.
    fn interact_object(&self, object: UnitId, is_done: &dyn Fn() -> bool)
    -> Result<(), ActionError>;

    fn clear_area(
        &self,
        center: Position,
        radius: i32,
        filter: MonsterFilter,
    ) -> Result<(), ActionError>;
}
