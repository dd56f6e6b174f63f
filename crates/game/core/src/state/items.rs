use strum::Display;

/// Belt potion categories the bot can ask the belt manager to drink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum PotionKind {
    Healing,
    Mana,
    Rejuvenation,
}
