//! Duel configuration.
//!
//! A duel is built from a `DuelConfig`:
//! - `PlayerConfig`: name, main deck, extra deck and an optional deck order
//! - `DuelOptions`: shuffling, seed, starting life points and initial
//!   placements (cards put directly into zones before the first command)
//!
//! Configs are plain data and deserialize from JSON, so a lobby or relay can
//! hand one over without touching engine types.
//!
//! ```
//! use duel_engine::cards::{CardData, CardType};
//! use duel_engine::core::{DuelConfig, DuelOptions, PlayerConfig};
//!
//! let goblin = CardData::new(1, "Goblin", CardType::MONSTER | CardType::NORMAL).with_stats(1000, 1000);
//! let config = DuelConfig::new(
//!     PlayerConfig::new("Yugi").with_main_deck(vec![goblin.clone(); 3]),
//!     PlayerConfig::new("Kaiba").with_main_deck(vec![goblin; 3]),
//! )
//! .with_options(DuelOptions::default().with_seed(7));
//!
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use super::error::{DuelError, Result};
use super::player::PLAYER_COUNT;
use crate::cards::{CardData, Position};
use crate::zones::ZoneAddress;

/// Life points each duelist starts with unless configured otherwise.
pub const DEFAULT_LIFE_POINTS: i64 = 8000;

/// Full construction input for a duel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelConfig {
    /// Exactly two players, player 0 first.
    pub players: Vec<PlayerConfig>,

    #[serde(default)]
    pub options: DuelOptions,
}

impl DuelConfig {
    /// Create a config for two players with default options.
    pub fn new(first: PlayerConfig, second: PlayerConfig) -> Self {
        Self {
            players: vec![first, second],
            options: DuelOptions::default(),
        }
    }

    /// Replace the options (builder pattern).
    #[must_use]
    pub fn with_options(mut self, options: DuelOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DuelError::InvalidConfig(e.to_string()))
    }

    /// Check the config can build a duel.
    ///
    /// - exactly two players
    /// - every supplied main deck order is a permutation of the deck indices
    /// - initial placements do not target material pools
    pub fn validate(&self) -> Result<()> {
        if self.players.len() != PLAYER_COUNT {
            return Err(DuelError::InvalidConfig(format!(
                "a duel needs {PLAYER_COUNT} players, got {}",
                self.players.len()
            )));
        }

        for player in &self.players {
            if let Some(order) = &player.main_deck_order {
                let mut seen = vec![false; player.main_deck.len()];
                let complete = order.len() == seen.len()
                    && order
                        .iter()
                        .all(|&i| i < seen.len() && !std::mem::replace(&mut seen[i], true));
                if !complete {
                    return Err(DuelError::InvalidConfig(format!(
                        "main deck order for {} is not a permutation of 0..{}",
                        player.name,
                        player.main_deck.len()
                    )));
                }
            }
        }

        for placement in &self.options.field_state {
            if placement.zone.kind.is_overlay() {
                return Err(DuelError::InvalidConfig(format!(
                    "cannot place a card directly into material pool {}",
                    placement.zone
                )));
            }
        }

        Ok(())
    }
}

/// One duelist's construction input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    pub name: String,

    #[serde(default)]
    pub main_deck: Vec<CardData>,

    #[serde(default)]
    pub extra_deck: Vec<CardData>,

    /// Indices into `main_deck`, bottom card first. Used when shuffling is
    /// disabled; identity order when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_deck_order: Option<Vec<usize>>,
}

impl PlayerConfig {
    /// Create an empty player config.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main_deck: Vec::new(),
            extra_deck: Vec::new(),
            main_deck_order: None,
        }
    }

    #[must_use]
    pub fn with_main_deck(mut self, cards: Vec<CardData>) -> Self {
        self.main_deck = cards;
        self
    }

    #[must_use]
    pub fn with_extra_deck(mut self, cards: Vec<CardData>) -> Self {
        self.extra_deck = cards;
        self
    }

    #[must_use]
    pub fn with_main_deck_order(mut self, order: Vec<usize>) -> Self {
        self.main_deck_order = Some(order);
        self
    }
}

/// Duel-wide options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DuelOptions {
    /// Shuffle main decks with the duel RNG. When false, the supplied
    /// `main_deck_order` (or deck list order) is used.
    pub shuffle_decks: bool,

    /// Seed for the duel RNG.
    pub seed: u64,

    pub starting_life_points: i64,

    /// Cards placed directly into zones at construction.
    pub field_state: Vec<InitialPlacement>,
}

impl Default for DuelOptions {
    fn default() -> Self {
        Self {
            shuffle_decks: true,
            seed: 0,
            starting_life_points: DEFAULT_LIFE_POINTS,
            field_state: Vec::new(),
        }
    }
}

impl DuelOptions {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Keep decks in their supplied order.
    #[must_use]
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle_decks = false;
        self
    }

    #[must_use]
    pub fn with_life_points(mut self, life_points: i64) -> Self {
        self.starting_life_points = life_points;
        self
    }

    /// Add an initial placement (builder pattern).
    #[must_use]
    pub fn with_placement(mut self, zone: ZoneAddress, card: CardData, position: Option<Position>) -> Self {
        self.field_state.push(InitialPlacement { zone, card, position });
        self
    }
}

/// A card put straight into a zone when the duel is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialPlacement {
    /// Destination; its player becomes the card's owner.
    pub zone: ZoneAddress,
    pub card: CardData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}
