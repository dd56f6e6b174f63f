use crate::state::{GameObject, Monster, Position};

/// Read-only view of the live game, backed by cheap in-memory snapshot reads.
pub trait GameView: Send + Sync {
    fn player_position(&self) -> Position;

    /// Current player life as a percentage of maximum (0-100).
    fn hp_percent(&self) -> i32;

    fn mana_percent(&self) -> i32;

    fn is_poisoned(&self) -> bool;

    /// Every monster in the current snapshot, dead ones included.
    fn monsters(&self) -> Vec<Monster>;

    fn is_walkable(&self, position: Position) -> bool;

    /// Objects cached for the current area.
    fn objects(&self) -> Vec<GameObject> {
        Vec::new()
    }

    /// Re-reads the game snapshot. Implementations that always read live
    /// memory can leave this as a no-op.
    fn refresh(&self) {}

    fn living_monsters(&self) -> Vec<Monster> {
        self.monsters()
            .into_iter()
            .filter(|monster| monster.is_alive())
            .collect()
    }
}
