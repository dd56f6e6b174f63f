use crate::state::PotionKind;

/// Belt bookkeeping owned by the potion subsystem.
pub trait BeltManager: Send + Sync {
    /// Drinks a potion of `kind`. Returns false when none is available.
    fn drink_potion(&self, kind: PotionKind, for_mercenary: bool) -> bool;
}
