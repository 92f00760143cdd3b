//! Card definitions - static card data.
//!
//! `CardData` holds the printed properties of a card: passcode, name, type
//! flags and printed stats. Two copies of "Blue-Eyes White Dragon" in a deck
//! share the same `CardData`.
//!
//! Duel-specific data (position, stat overrides, materials) is stored
//! separately in `Card`.

use std::cmp::Ordering;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Card type flags, bit-compatible with the usual card database layout.
    ///
    /// Serializes as a readable flag list (`"MONSTER | NORMAL"`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CardType: u32 {
        const MONSTER  = 0x1;
        const SPELL    = 0x2;
        const TRAP     = 0x4;
        const NORMAL   = 0x10;
        const EFFECT   = 0x20;
        const FUSION   = 0x40;
        const RITUAL   = 0x80;
        const SYNCHRO  = 0x2000;
        const TOKEN    = 0x4000;
        const FIELD    = 0x80000;
        const XYZ      = 0x80_0000;
        const PENDULUM = 0x100_0000;
        const LINK     = 0x400_0000;
    }
}

impl CardType {
    /// Types that live in the extra deck rather than the main deck.
    pub const EXTRA_DECK: CardType = CardType::FUSION
        .union(CardType::SYNCHRO)
        .union(CardType::XYZ)
        .union(CardType::LINK);

    /// Ordering rank of extra deck categories: Fusion, Synchro, XYZ, Link.
    #[must_use]
    pub fn extra_deck_rank(self) -> u8 {
        if self.contains(CardType::FUSION) {
            0
        } else if self.contains(CardType::SYNCHRO) {
            1
        } else if self.contains(CardType::XYZ) {
            2
        } else if self.contains(CardType::LINK) {
            3
        } else {
            4
        }
    }
}

/// Static card data.
///
/// ## Example
///
/// ```
/// use duel_engine::cards::{CardData, CardType};
///
/// let dragon = CardData::new(89631139, "Blue-Eyes White Dragon", CardType::MONSTER | CardType::NORMAL)
///     .with_stats(3000, 2500)
///     .with_level(8);
///
/// assert!(dragon.is_main_deck_card());
/// assert_eq!(dragon.atk, Some(3000));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    /// Passcode.
    pub id: u32,

    pub name: String,

    pub card_type: CardType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atk: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def: Option<i32>,

    /// Level or rank. Absent for spells, traps and links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl CardData {
    /// Create card data without stats.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id,
            name: name.into(),
            card_type,
            atk: None,
            def: None,
            level: None,
        }
    }

    /// Set printed ATK/DEF (builder pattern).
    #[must_use]
    pub fn with_stats(mut self, atk: i32, def: i32) -> Self {
        self.atk = Some(atk);
        self.def = Some(def);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    /// Whether the card belongs in the main deck.
    #[must_use]
    pub fn is_main_deck_card(&self) -> bool {
        !self.card_type.intersects(CardType::EXTRA_DECK)
    }

    #[must_use]
    pub fn is_pendulum(&self) -> bool {
        self.card_type.contains(CardType::PENDULUM)
    }

    /// Order of face-down extra deck cards: category, then name.
    #[must_use]
    pub fn extra_deck_order(&self, other: &CardData) -> Ordering {
        self.card_type
            .extra_deck_rank()
            .cmp(&other.card_type.extra_deck_rank())
            .then_with(|| self.name.cmp(&other.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_deck_classification() {
        let normal = CardData::new(1, "Goblin", CardType::MONSTER | CardType::NORMAL);
        let xyz = CardData::new(2, "Utopia", CardType::MONSTER | CardType::XYZ | CardType::EFFECT);
        let pendulum = CardData::new(3, "Magician", CardType::MONSTER | CardType::PENDULUM);

        assert!(normal.is_main_deck_card());
        assert!(!xyz.is_main_deck_card());
        assert!(pendulum.is_main_deck_card());
        assert!(pendulum.is_pendulum());
    }

    #[test]
    fn test_extra_deck_order() {
        let fusion = CardData::new(1, "Zeta", CardType::MONSTER | CardType::FUSION);
        let xyz_a = CardData::new(2, "Alpha", CardType::MONSTER | CardType::XYZ);
        let xyz_b = CardData::new(3, "Beta", CardType::MONSTER | CardType::XYZ);
        let link = CardData::new(4, "Aardvark", CardType::MONSTER | CardType::LINK);

        assert_eq!(fusion.extra_deck_order(&xyz_a), Ordering::Less);
        assert_eq!(xyz_a.extra_deck_order(&xyz_b), Ordering::Less);
        assert_eq!(link.extra_deck_order(&xyz_b), Ordering::Greater);
    }

    #[test]
    fn test_card_data_serialization() {
        let card = CardData::new(62318994, "Dragon", CardType::MONSTER | CardType::NORMAL)
            .with_stats(3000, 2500)
            .with_level(8);

        let json = serde_json::to_string(&card).unwrap();
        assert!(json.contains("\"cardType\""));
        let deserialized: CardData = serde_json::from_str(&json).unwrap();
        assert_eq!(card, deserialized);
    }

    #[test]
    fn test_stats_omitted_for_spells() {
        let spell = CardData::new(5, "Pot", CardType::SPELL);
        let json = serde_json::to_string(&spell).unwrap();
        assert!(!json.contains("atk"));
    }
}
