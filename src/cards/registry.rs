//! Card database for passcode lookup.
//!
//! Replays carry passcodes only. The `CardDatabase` maps them back to full
//! `CardData` when a duel is rebuilt.

use rustc_hash::FxHashMap;

use super::definition::CardData;
use crate::core::error::{DuelError, Result};

/// Passcode → card data.
///
/// ## Example
///
/// ```
/// use duel_engine::cards::{CardData, CardDatabase, CardType};
///
/// let mut db = CardDatabase::new();
/// db.insert(CardData::new(55144522, "Pot of Greed", CardType::SPELL));
///
/// assert_eq!(db.get(55144522).unwrap().name, "Pot of Greed");
/// assert!(db.require(1).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardDatabase {
    cards: FxHashMap<u32, CardData>,
}

impl CardDatabase {
    /// Create a new empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a database from card data. Later duplicates replace earlier ones.
    pub fn from_cards(cards: impl IntoIterator<Item = CardData>) -> Self {
        let mut db = Self::new();
        for card in cards {
            db.insert(card);
        }
        db
    }

    /// Insert card data, returning the previous entry for that passcode.
    pub fn insert(&mut self, card: CardData) -> Option<CardData> {
        self.cards.insert(card.id, card)
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&CardData> {
        self.cards.get(&id)
    }

    /// Get card data or fail with `UnknownCard`.
    pub fn require(&self, id: u32) -> Result<&CardData> {
        self.get(id).ok_or(DuelError::UnknownCard(id))
    }

    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.cards.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardData> {
        self.cards.values()
    }
}

impl FromIterator<CardData> for CardDatabase {
    fn from_iter<I: IntoIterator<Item = CardData>>(iter: I) -> Self {
        Self::from_cards(iter)
    }
}
