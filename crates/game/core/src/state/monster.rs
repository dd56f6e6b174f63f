use bitflags::bitflags;

use super::{Position, UnitId};

bitflags! {
    /// Type flags attached to a monster unit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MonsterFlags: u8 {
        const ELITE = 1 << 0;
        const CHAMPION = 1 << 1;
        const UNIQUE = 1 << 2;
        const SUPER_UNIQUE = 1 << 3;
        const MINION = 1 << 4;
        /// Baal-wave souls (burning, gloam, black) whose lightning is lethal.
        const SOUL = 1 << 5;

        const ANY_ELITE = Self::ELITE.bits()
            | Self::CHAMPION.bits()
            | Self::UNIQUE.bits()
            | Self::SUPER_UNIQUE.bits()
            | Self::MINION.bits();
    }
}

/// Transient monster snapshot; re-read every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Monster {
    pub id: UnitId,
    pub position: Position,
    pub life: i32,
    pub flags: MonsterFlags,
}

impl Monster {
    pub const fn new(id: UnitId, position: Position, life: i32) -> Self {
        Self {
            id,
            position,
            life,
            flags: MonsterFlags::empty(),
        }
    }

    pub const fn with_flags(mut self, flags: MonsterFlags) -> Self {
        self.flags = flags;
        self
    }

    pub const fn is_alive(&self) -> bool {
        self.life > 0
    }

    pub fn is_elite(&self) -> bool {
        self.flags.intersects(MonsterFlags::ANY_ELITE)
    }

    pub fn is_soul(&self) -> bool {
        self.flags.contains(MonsterFlags::SOUL)
    }
}

/// Selects which monsters an area-clear command should engage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MonsterFilter {
    #[default]
    All,
    EliteOnly,
    /// Monsters carrying every one of the given flags.
    Flags(MonsterFlags),
}

impl MonsterFilter {
    pub fn matches(&self, monster: &Monster) -> bool {
        match self {
            MonsterFilter::All => true,
            MonsterFilter::EliteOnly => monster.is_elite(),
            MonsterFilter::Flags(flags) => monster.flags.contains(*flags),
        }
    }
}
