//! Card instances - duel-time card state.
//!
//! A `Card` is one physical copy of a card in a duel. It lives in the card
//! arena of `FieldState` and is referred to everywhere else by its
//! `CardHandle`. Zones and XYZ material lists hold handles, never cards, so
//! each card has exactly one location.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::definition::CardData;
use crate::core::entity::CardHandle;
use crate::core::player::PlayerId;
use crate::zones::ZoneKind;

/// Ordered XYZ materials attached to a host.
pub type Materials = SmallVec<[CardHandle; 4]>;

/// Battle position / facing of a card.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Position {
    #[default]
    FaceupAttack,
    FaceupDefense,
    Facedown,
    /// Face-up outside the monster zones (spells, hand, graveyard).
    Faceup,
}

impl Position {
    #[must_use]
    pub fn is_facedown(self) -> bool {
        self == Position::Facedown
    }
}

/// Where a card returned to the deck is placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeckPosition {
    #[default]
    Top,
    Bottom,
}

/// A card in the duel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Arena slot of this card.
    pub handle: CardHandle,

    pub data: CardData,

    pub position: Position,

    /// ATK override; `None` shows the printed value.
    pub current_atk: Option<i32>,

    /// DEF override; `None` shows the printed value.
    pub current_def: Option<i32>,

    /// Player whose zone currently holds the card.
    pub owner: PlayerId,

    /// Player whose deck the card started in.
    pub original_owner: PlayerId,

    /// XYZ materials, first attached first.
    pub materials: Materials,

    pub is_main_deck_card: bool,

    pub is_token: bool,
}

impl Card {
    /// Create a card owned by `owner`.
    #[must_use]
    pub fn new(handle: CardHandle, data: CardData, owner: PlayerId) -> Self {
        let is_main_deck_card = data.is_main_deck_card();
        Self {
            handle,
            data,
            position: Position::Facedown,
            current_atk: None,
            current_def: None,
            owner,
            original_owner: owner,
            materials: Materials::new(),
            is_main_deck_card,
            is_token: false,
        }
    }

    /// Create a token owned by `owner`.
    #[must_use]
    pub fn token(handle: CardHandle, data: CardData, owner: PlayerId) -> Self {
        Self {
            is_token: true,
            is_main_deck_card: false,
            position: Position::FaceupAttack,
            ..Self::new(handle, data, owner)
        }
    }

    /// Passcode.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.data.id
    }

    /// ATK as currently shown.
    #[must_use]
    pub fn atk(&self) -> Option<i32> {
        self.current_atk.or(self.data.atk)
    }

    /// DEF as currently shown.
    #[must_use]
    pub fn def(&self) -> Option<i32> {
        self.current_def.or(self.data.def)
    }

    /// Whether the card sits in the extra deck face-up (main-deck pendulum).
    #[must_use]
    pub fn is_faceup_pendulum(&self) -> bool {
        self.is_main_deck_card && self.data.is_pendulum()
    }

    /// Position a card takes when moved from `from` to `to` without an
    /// explicit position.
    #[must_use]
    pub fn default_position(&self, from: ZoneKind, to: ZoneKind) -> Position {
        match to {
            ZoneKind::Monster | ZoneKind::ExtraMonster => {
                if from.is_monster_zone() {
                    self.position
                } else {
                    Position::FaceupAttack
                }
            }
            ZoneKind::Deck => Position::Facedown,
            ZoneKind::ExtraDeck if !self.is_faceup_pendulum() => Position::Facedown,
            _ => Position::Faceup,
        }
    }

    /// Clear ATK/DEF overrides.
    pub fn reset_stats(&mut self) {
        self.current_atk = None;
        self.current_def = None;
    }
}
