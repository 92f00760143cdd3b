//! Zone addresses.
//!
//! Every card location is named by a compact string:
//!
//! | Address | Meaning |
//! |---|---|
//! | `M-3` | player 0, monster zone 3 |
//! | `S2-1` | player 1, spell/trap zone 1 |
//! | `EMZ-2` | player 0, extra monster zone 2 |
//! | `H-4`, `D-40`, `ED-1`, `GY-1`, `B-2` | pile positions (1-based) |
//! | `GY2`, `D` | pile without index: default insertion point |
//! | `F`, `F2` | field spell slot |
//! | `ORU-1`, `ORUEMZ2-1` | material pool of a monster / extra monster zone |
//!
//! Player 1 kinds carry a `2` suffix. For every valid address
//! `addr.to_string().parse() == Ok(addr)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{DuelError, Result};
use crate::core::player::PlayerId;

/// Zone kind segment of an address.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum ZoneKind {
    #[strum(serialize = "M")]
    #[serde(rename = "M")]
    Monster,
    #[strum(serialize = "S")]
    #[serde(rename = "S")]
    SpellTrap,
    #[strum(serialize = "EMZ")]
    #[serde(rename = "EMZ")]
    ExtraMonster,
    #[strum(serialize = "H")]
    #[serde(rename = "H")]
    Hand,
    #[strum(serialize = "D")]
    #[serde(rename = "D")]
    Deck,
    #[strum(serialize = "ED")]
    #[serde(rename = "ED")]
    ExtraDeck,
    #[strum(serialize = "GY")]
    #[serde(rename = "GY")]
    Graveyard,
    #[strum(serialize = "B")]
    #[serde(rename = "B")]
    Banished,
    #[strum(serialize = "F")]
    #[serde(rename = "F")]
    FieldSpell,
    #[strum(serialize = "ORU")]
    #[serde(rename = "ORU")]
    Overlay,
    #[strum(serialize = "ORUEMZ")]
    #[serde(rename = "ORUEMZ")]
    ExtraOverlay,
}

impl ZoneKind {
    /// Number of slots for fixed-size zones, `None` for piles and the field
    /// spell slot.
    #[must_use]
    pub const fn slot_count(self) -> Option<usize> {
        match self {
            ZoneKind::Monster | ZoneKind::SpellTrap | ZoneKind::Overlay => Some(5),
            ZoneKind::ExtraMonster | ZoneKind::ExtraOverlay => Some(2),
            _ => None,
        }
    }

    /// Ordered zones of variable length.
    #[must_use]
    pub const fn is_pile(self) -> bool {
        matches!(
            self,
            ZoneKind::Hand | ZoneKind::Deck | ZoneKind::ExtraDeck | ZoneKind::Graveyard | ZoneKind::Banished
        )
    }

    /// Monster and extra monster zones.
    #[must_use]
    pub const fn is_monster_zone(self) -> bool {
        matches!(self, ZoneKind::Monster | ZoneKind::ExtraMonster)
    }

    /// Zones on the field proper: monster, spell/trap, extra monster, field spell.
    #[must_use]
    pub const fn is_on_field(self) -> bool {
        matches!(
            self,
            ZoneKind::Monster | ZoneKind::SpellTrap | ZoneKind::ExtraMonster | ZoneKind::FieldSpell
        )
    }

    /// Material pools. These never hold a card directly.
    #[must_use]
    pub const fn is_overlay(self) -> bool {
        matches!(self, ZoneKind::Overlay | ZoneKind::ExtraOverlay)
    }
}

/// A parsed zone address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZoneAddress {
    pub kind: ZoneKind,
    pub player: PlayerId,
    /// 1-based position; `None` for the field spell slot or a pile's
    /// default insertion point.
    pub index: Option<usize>,
}

impl ZoneAddress {
    /// Create an address, validating the index against the zone kind.
    ///
    /// ```
    /// use duel_engine::core::PlayerId;
    /// use duel_engine::zones::{ZoneAddress, ZoneKind};
    ///
    /// let addr = ZoneAddress::new(ZoneKind::Monster, PlayerId::SECOND, Some(3)).unwrap();
    /// assert_eq!(addr.to_string(), "M2-3");
    /// assert!(ZoneAddress::new(ZoneKind::Monster, PlayerId::FIRST, Some(6)).is_err());
    /// ```
    pub fn new(kind: ZoneKind, player: PlayerId, index: Option<usize>) -> Result<Self> {
        let addr = Self { kind, player, index };
        if !player.is_valid() {
            return Err(DuelError::InvalidZoneAddress(format!("{kind} for {player}")));
        }
        let valid = match (kind.slot_count(), index) {
            (Some(count), Some(i)) => (1..=count).contains(&i),
            (Some(_), None) => false,
            (None, index) if kind == ZoneKind::FieldSpell => index.is_none(),
            (None, index) => index.map_or(true, |i| i >= 1),
        };
        if valid {
            Ok(addr)
        } else {
            Err(DuelError::InvalidZoneAddress(addr.to_string()))
        }
    }

    pub fn hand(player: PlayerId) -> Self {
        Self { kind: ZoneKind::Hand, player, index: None }
    }

    pub fn deck(player: PlayerId) -> Self {
        Self { kind: ZoneKind::Deck, player, index: None }
    }

    pub fn extra_deck(player: PlayerId) -> Self {
        Self { kind: ZoneKind::ExtraDeck, player, index: None }
    }

    pub fn graveyard(player: PlayerId) -> Self {
        Self { kind: ZoneKind::Graveyard, player, index: None }
    }

    pub fn banished(player: PlayerId) -> Self {
        Self { kind: ZoneKind::Banished, player, index: None }
    }

    pub fn field_spell(player: PlayerId) -> Self {
        Self { kind: ZoneKind::FieldSpell, player, index: None }
    }

    /// Position `index` (1-based, 1 = bottom) of `player`'s main deck.
    pub fn deck_slot(player: PlayerId, index: usize) -> Self {
        Self { kind: ZoneKind::Deck, player, index: Some(index) }
    }

    /// Same zone with another index.
    #[must_use]
    pub fn with_index(self, index: usize) -> Self {
        Self { index: Some(index), ..self }
    }

    /// 0-based position, if the address has one. Index 0 is not a position.
    pub fn offset(self) -> Result<Option<usize>> {
        match self.index {
            Some(0) => Err(DuelError::InvalidZoneAddress(self.to_string())),
            index => Ok(index.map(|i| i - 1)),
        }
    }

    /// Material pool address for a host in `host`.
    ///
    /// ```
    /// use duel_engine::zones::ZoneAddress;
    ///
    /// let host: ZoneAddress = "EMZ2-1".parse().unwrap();
    /// assert_eq!(ZoneAddress::overlay_zone_for(host).unwrap().to_string(), "ORUEMZ2-1");
    /// ```
    pub fn overlay_zone_for(host: ZoneAddress) -> Result<Self> {
        let kind = match host.kind {
            ZoneKind::Monster => ZoneKind::Overlay,
            ZoneKind::ExtraMonster => ZoneKind::ExtraOverlay,
            _ => return Err(DuelError::InvalidZoneAddress(format!("{host} cannot hold materials"))),
        };
        Ok(Self { kind, ..host })
    }

    /// Host zone of a material pool address.
    pub fn host_zone(self) -> Result<Self> {
        let kind = match self.kind {
            ZoneKind::Overlay => ZoneKind::Monster,
            ZoneKind::ExtraOverlay => ZoneKind::ExtraMonster,
            _ => return Err(DuelError::InvalidZoneAddress(format!("{self} is not a material pool"))),
        };
        Ok(Self { kind, ..self })
    }
}

impl fmt::Display for ZoneAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_ref())?;
        if self.player == PlayerId::SECOND {
            f.write_str("2")?;
        }
        if let Some(index) = self.index {
            write!(f, "-{index}")?;
        }
        Ok(())
    }
}

impl FromStr for ZoneAddress {
    type Err = DuelError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DuelError::InvalidZoneAddress(s.to_string());

        let (segment, index) = match s.split_once('-') {
            Some((segment, index)) => {
                // Canonical decimal only, so parsing and printing agree.
                if !index.bytes().all(|b| b.is_ascii_digit()) || index.starts_with('0') {
                    return Err(invalid());
                }
                let index = index.parse::<usize>().map_err(|_| invalid())?;
                (segment, Some(index))
            }
            None => (s, None),
        };

        let (kind, player) = match segment.strip_suffix('2') {
            Some(kind) => (kind, PlayerId::SECOND),
            None => (segment, PlayerId::FIRST),
        };
        let kind = ZoneKind::from_str(kind).map_err(|_| invalid())?;

        Self::new(kind, player, index).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ZoneAddress {
    type Error = DuelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ZoneAddress> for String {
    fn from(addr: ZoneAddress) -> Self {
        addr.to_string()
    }
}
