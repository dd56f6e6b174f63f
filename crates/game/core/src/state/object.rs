use super::{Position, UnitId};

/// Interactable world object from the cached area lists (portals, shrines,
/// seals, chests).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameObject {
    pub id: UnitId,
    pub name: String,
    pub position: Position,
}

impl GameObject {
    pub fn new(id: UnitId, name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            position,
        }
    }
}
