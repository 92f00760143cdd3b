//! Field state store: the card arena plus both duelists' zones.
//!
//! `FieldState` is the single authoritative copy of the duel. Cards live in
//! an arena (`im::Vector<Option<Card>>`) indexed by `CardHandle`; zones and
//! material lists hold handles. Every live handle sits in exactly one zone
//! slot or one host's materials, which `verify_integrity` checks.
//!
//! All storage is persistent, so `clone()` is O(1) and is used by the
//! command stack to snapshot the field before each mutation.
//!
//! ## Insertion rules (`set_card` without an index)
//!
//! | Zone | Default insertion point |
//! |---|---|
//! | hand | end (rightmost) |
//! | main deck | top |
//! | graveyard, banished | position 1 (most recent) |
//! | extra deck | main-deck pendulums at the front, others sorted by category then name |
//!
//! An explicit pile index inserts at that position, clamped to the pile
//! length.

use im::Vector;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::address::{ZoneAddress, ZoneKind};
use super::field::PlayerField;
use crate::cards::{Card, CardData, Materials, Position};
use crate::core::entity::CardHandle;
use crate::core::error::{DuelError, Result};
use crate::core::phase::Phase;
use crate::core::player::{PlayerId, PlayerMap};
use crate::core::rng::{apply_swaps, validate_swaps};

/// Authoritative duel state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    cards: Vector<Option<Card>>,
    players: PlayerMap<PlayerField>,
    turn: u32,
    turn_player: PlayerId,
    phase: Phase,
}

/// One occupied position in an end-field snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSnapshot {
    pub zone: ZoneAddress,
    pub id: u32,
    /// Present only when the card is not in its zone's resting position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atk: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<u32>,
}

impl FieldState {
    /// Empty field for two players.
    #[must_use]
    pub fn new(starting_life_points: i64) -> Self {
        Self {
            cards: Vector::new(),
            players: PlayerMap::new(|_| PlayerField::new(starting_life_points)),
            turn: 1,
            turn_player: PlayerId::FIRST,
            phase: Phase::Draw,
        }
    }

    // === Arena ===

    /// Add a card to the arena. The card is not placed in any zone.
    pub fn alloc_card(&mut self, data: CardData, owner: PlayerId, token: bool) -> CardHandle {
        let handle = CardHandle::from_index(self.cards.len());
        let card = if token {
            Card::token(handle, data, owner)
        } else {
            Card::new(handle, data, owner)
        };
        self.cards.push_back(Some(card));
        handle
    }

    /// Drop the most recently allocated card. It must be the last arena slot.
    pub fn free_last_card(&mut self, handle: CardHandle) -> Result<Card> {
        if handle.index() + 1 != self.cards.len() {
            return Err(DuelError::Integrity(format!(
                "{handle} is not the newest card in the arena"
            )));
        }
        self.cards
            .pop_back()
            .flatten()
            .ok_or_else(|| DuelError::Integrity(format!("{handle} is not live")))
    }

    /// Take a card out of the arena, leaving its slot empty.
    pub fn take_card(&mut self, handle: CardHandle) -> Result<Card> {
        self.cards
            .get_mut(handle.index())
            .and_then(Option::take)
            .ok_or_else(|| DuelError::Integrity(format!("{handle} is not live")))
    }

    /// Put a previously taken card back into its arena slot.
    pub fn restore_card(&mut self, card: Card) -> Result<()> {
        let handle = card.handle;
        let not_free = || DuelError::Integrity(format!("arena slot of {handle} is not free"));
        let slot = self.cards.get_mut(handle.index()).ok_or_else(not_free)?;
        if slot.is_some() {
            return Err(not_free());
        }
        *slot = Some(card);
        Ok(())
    }

    pub fn card(&self, handle: CardHandle) -> Result<&Card> {
        self.cards
            .get(handle.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| DuelError::Integrity(format!("{handle} is not live")))
    }

    pub fn card_mut(&mut self, handle: CardHandle) -> Result<&mut Card> {
        self.cards
            .get_mut(handle.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| DuelError::Integrity(format!("{handle} is not live")))
    }

    /// All live cards in handle order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().flatten()
    }

    /// Number of arena slots, including freed ones.
    #[must_use]
    pub fn arena_len(&self) -> usize {
        self.cards.len()
    }

    // === Players and counters ===

    pub fn ensure_player(&self, player: PlayerId) -> Result<()> {
        if player.is_valid() {
            Ok(())
        } else {
            Err(DuelError::UnknownPlayer(player))
        }
    }

    pub fn player_field(&self, player: PlayerId) -> Result<&PlayerField> {
        self.ensure_player(player)?;
        Ok(&self.players[player])
    }

    fn player_field_mut(&mut self, player: PlayerId) -> Result<&mut PlayerField> {
        self.ensure_player(player)?;
        Ok(&mut self.players[player])
    }

    pub fn life_points(&self, player: PlayerId) -> Result<i64> {
        Ok(self.player_field(player)?.life_points)
    }

    pub fn set_life_points(&mut self, player: PlayerId, life_points: i64) -> Result<()> {
        self.player_field_mut(player)?.life_points = life_points;
        Ok(())
    }

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn turn_player(&self) -> PlayerId {
        self.turn_player
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_turn(&mut self, turn: u32, turn_player: PlayerId) {
        self.turn = turn;
        self.turn_player = turn_player;
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    // === Zone access ===

    /// Card held at an address.
    ///
    /// Pile addresses without an index resolve to `None`. Material pools are
    /// not addressable this way.
    pub fn card_at(&self, addr: &ZoneAddress) -> Result<Option<CardHandle>> {
        let field = self.player_field(addr.player)?;
        if let Some(slots) = field.slots(addr.kind) {
            let offset = addr.offset()?.unwrap_or(0);
            return Ok(slots.get(offset).copied().flatten());
        }
        match field.pile(addr.kind) {
            Some(pile) => Ok(addr.offset()?.and_then(|i| pile.get(i)).copied()),
            None => Err(DuelError::InvalidZoneAddress(format!(
                "{addr} does not hold cards directly"
            ))),
        }
    }

    /// Card with passcode `id` at `addr`, or `CardNotFoundInZone`.
    pub fn card_by_id(&self, id: u32, addr: &ZoneAddress) -> Result<CardHandle> {
        let not_found = || DuelError::CardNotFoundInZone { id: Some(id), zone: *addr };
        let handle = self.card_at(addr)?.ok_or_else(not_found)?;
        if self.card(handle)?.id() == id {
            Ok(handle)
        } else {
            Err(not_found())
        }
    }

    /// Write a card to (or clear) an address. Returns the address the card
    /// actually landed at.
    ///
    /// Placing a card makes the address's player its owner. The extra deck
    /// only takes insertions; clearing one of its positions goes through
    /// `remove_card`.
    pub fn set_card(&mut self, handle: Option<CardHandle>, addr: &ZoneAddress) -> Result<ZoneAddress> {
        match handle {
            Some(handle) => self.insert_card(handle, addr),
            None if addr.kind == ZoneKind::ExtraDeck => Err(DuelError::NoCardToInsert(*addr)),
            None => self.clear_address(addr).map(|_| *addr),
        }
    }

    /// Remove whatever card sits at `addr`.
    pub fn remove_card(&mut self, addr: &ZoneAddress) -> Result<CardHandle> {
        if self.card_at(addr)?.is_none() {
            return Err(DuelError::CardNotFoundInZone { id: None, zone: *addr });
        }
        self.clear_address(addr)
    }

    /// Remove the card with passcode `id` from `addr`.
    pub fn take_expected(&mut self, id: u32, addr: &ZoneAddress) -> Result<CardHandle> {
        self.card_by_id(id, addr)?;
        self.clear_address(addr)
    }

    /// Move `handle` from `from` to `to`. Returns the resolved destination.
    pub fn move_card(&mut self, handle: CardHandle, from: &ZoneAddress, to: &ZoneAddress) -> Result<ZoneAddress> {
        if self.card_at(from)? != Some(handle) {
            let id = self.card(handle)?.id();
            return Err(DuelError::CardNotFoundInZone { id: Some(id), zone: *from });
        }
        self.clear_address(from)?;
        self.insert_card(handle, to)
    }

    fn insert_card(&mut self, handle: CardHandle, addr: &ZoneAddress) -> Result<ZoneAddress> {
        let resolved = if addr.kind == ZoneKind::ExtraDeck && addr.index.is_none() {
            let offset = self.extra_deck_offset(handle, addr.player)?;
            addr.with_index(offset + 1)
        } else {
            *addr
        };

        let field = self.player_field_mut(addr.player)?;
        let resolved = if let Some(slots) = field.slots_mut(addr.kind) {
            let slot = slots
                .get_mut(addr.offset()?.unwrap_or(0))
                .ok_or_else(|| DuelError::InvalidZoneAddress(addr.to_string()))?;
            if slot.is_some() {
                return Err(DuelError::ZoneOccupied(*addr));
            }
            *slot = Some(handle);
            resolved
        } else if let Some(pile) = field.pile_mut(addr.kind) {
            let offset = match resolved.offset()? {
                Some(offset) => offset.min(pile.len()),
                None => match addr.kind {
                    ZoneKind::Graveyard | ZoneKind::Banished => 0,
                    _ => pile.len(),
                },
            };
            pile.insert(offset, handle);
            addr.with_index(offset + 1)
        } else {
            return Err(DuelError::InvalidZoneAddress(format!(
                "{addr} does not hold cards directly"
            )));
        };

        self.card_mut(handle)?.owner = addr.player;
        trace!(%handle, zone = %resolved, "card placed");
        Ok(resolved)
    }

    fn clear_address(&mut self, addr: &ZoneAddress) -> Result<CardHandle> {
        let field = self.player_field_mut(addr.player)?;
        let not_found = || DuelError::CardNotFoundInZone { id: None, zone: *addr };
        let handle = if let Some(slots) = field.slots_mut(addr.kind) {
            slots
                .get_mut(addr.offset()?.unwrap_or(0))
                .and_then(Option::take)
                .ok_or_else(not_found)?
        } else if let Some(pile) = field.pile_mut(addr.kind) {
            let offset = addr
                .offset()?
                .ok_or_else(|| DuelError::InvalidZoneAddress(format!("{addr} names no position to clear")))?;
            if offset >= pile.len() {
                return Err(not_found());
            }
            pile.remove(offset)
        } else {
            return Err(DuelError::InvalidZoneAddress(format!(
                "{addr} does not hold cards directly"
            )));
        };
        trace!(%handle, zone = %addr, "card removed");
        Ok(handle)
    }

    /// Sorted insertion offset for a card entering `player`'s extra deck.
    fn extra_deck_offset(&self, handle: CardHandle, player: PlayerId) -> Result<usize> {
        let card = self.card(handle)?;
        if card.is_faceup_pendulum() {
            return Ok(0);
        }
        let pile = &self.player_field(player)?.extra_deck;
        for (offset, &other) in pile.iter().enumerate() {
            let other = self.card(other)?;
            if !other.is_faceup_pendulum() && other.data.extra_deck_order(&card.data).is_gt() {
                return Ok(offset);
            }
        }
        Ok(pile.len())
    }

    /// Handles listed at an address: the whole pile for pile kinds, the slot
    /// occupant for slot kinds, the host's materials for material pools.
    pub fn zone_cards(&self, addr: &ZoneAddress) -> Result<Vec<CardHandle>> {
        let field = self.player_field(addr.player)?;
        if let Some(pile) = field.pile(addr.kind) {
            return Ok(pile.iter().copied().collect());
        }
        if addr.kind.is_overlay() {
            return match self.card_at(&addr.host_zone()?)? {
                Some(host) => Ok(self.card(host)?.materials.to_vec()),
                None => Ok(Vec::new()),
            };
        }
        Ok(self.card_at(addr)?.into_iter().collect())
    }

    /// Number of cards in a pile.
    pub fn pile_len(&self, kind: ZoneKind, player: PlayerId) -> Result<usize> {
        self.player_field(player)?
            .pile(kind)
            .map(Vector::len)
            .ok_or_else(|| DuelError::InvalidZoneAddress(format!("{kind} is not a pile")))
    }

    /// Empty slot addresses of the given kinds for `player`.
    ///
    /// An extra monster zone index is unavailable while either player
    /// occupies it.
    pub fn available_zones(&self, kinds: &[ZoneKind], player: PlayerId) -> Result<Vec<ZoneAddress>> {
        let field = self.player_field(player)?;
        let mut zones = Vec::new();
        for &kind in kinds {
            let Some(slots) = field.slots(kind) else {
                continue;
            };
            for (offset, slot) in slots.iter().enumerate() {
                let taken = slot.is_some()
                    || (kind == ZoneKind::ExtraMonster
                        && self.players[player.opponent()].extra_monsters[offset].is_some());
                if !taken {
                    let index = (kind != ZoneKind::FieldSpell).then_some(offset + 1);
                    zones.push(ZoneAddress { kind, player, index });
                }
            }
        }
        Ok(zones)
    }

    /// Reorder a pile with a recorded swap sequence. `forward = false`
    /// reverts a previous forward application.
    pub fn shuffle_pile(&mut self, kind: ZoneKind, player: PlayerId, swaps: &[usize], forward: bool) -> Result<()> {
        let pile = self
            .player_field_mut(player)?
            .pile_mut(kind)
            .ok_or_else(|| DuelError::InvalidZoneAddress(format!("{kind} is not a pile")))?;
        validate_swaps(pile.len(), swaps)?;
        apply_swaps(swaps, forward, |i, j| pile.swap(i, j));
        Ok(())
    }

    // === Materials ===

    /// Insert a material into a host's list (`None` appends).
    pub fn attach_material(&mut self, host: CardHandle, material: CardHandle, at: Option<usize>) -> Result<()> {
        let materials = &mut self.card_mut(host)?.materials;
        let at = at.unwrap_or(materials.len()).min(materials.len());
        materials.insert(at, material);
        Ok(())
    }

    /// Remove the material at `index` (0-based) from a host.
    pub fn detach_material(&mut self, host: CardHandle, index: usize) -> Result<CardHandle> {
        let card = self.card_mut(host)?;
        if index >= card.materials.len() {
            return Err(DuelError::MaterialIndexOutOfRange {
                id: card.id(),
                index,
                count: card.materials.len(),
            });
        }
        Ok(card.materials.remove(index))
    }

    /// Replace a host's materials, returning the previous list.
    pub fn replace_materials(&mut self, host: CardHandle, materials: Materials) -> Result<Materials> {
        Ok(std::mem::replace(&mut self.card_mut(host)?.materials, materials))
    }

    // === Verification and export ===

    /// Check that every live card has exactly one location and that zone
    /// occupants are owned by the zone's player.
    pub fn verify_integrity(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        let mut claim = |handle: CardHandle, place: &dyn std::fmt::Display| {
            if seen.insert(handle) {
                Ok(())
            } else {
                Err(DuelError::Integrity(format!("{handle} appears twice (again at {place})")))
            }
        };

        for (player, field) in self.players.iter() {
            for (kind, index, handle) in field.occupants() {
                let zone = ZoneAddress {
                    kind,
                    player,
                    index: (kind != ZoneKind::FieldSpell).then_some(index),
                };
                claim(handle, &zone)?;
                let card = self.card(handle)?;
                if card.owner != player {
                    return Err(DuelError::Integrity(format!(
                        "{handle} in {zone} is owned by {}",
                        card.owner
                    )));
                }
                for &material in &card.materials {
                    claim(material, &handle)?;
                    self.card(material)?;
                }
            }
        }

        if let Some(lost) = self.cards().find(|card| !seen.contains(&card.handle)) {
            return Err(DuelError::Integrity(format!("{} has no location", lost.handle)));
        }
        Ok(())
    }

    /// Every occupied position of `player`'s side, in zone order.
    pub fn snapshot(&self, player: PlayerId) -> Result<Vec<ZoneSnapshot>> {
        let field = self.player_field(player)?;
        field
            .occupants()
            .map(|(kind, index, handle)| {
                let card = self.card(handle)?;
                let materials = card
                    .materials
                    .iter()
                    .map(|&m| self.card(m).map(Card::id))
                    .collect::<Result<Vec<_>>>()?;
                Ok(ZoneSnapshot {
                    zone: ZoneAddress {
                        kind,
                        player,
                        index: (kind != ZoneKind::FieldSpell).then_some(index),
                    },
                    id: card.id(),
                    position: (card.position != resting_position(kind)).then_some(card.position),
                    atk: card.current_atk,
                    def: card.current_def,
                    materials,
                })
            })
            .collect()
    }

    /// Encode a checkpoint.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a checkpoint and check its integrity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let state: Self = bincode::deserialize(bytes)?;
        state.verify_integrity()?;
        Ok(state)
    }
}

/// Position a card normally has in a zone of this kind.
fn resting_position(kind: ZoneKind) -> Position {
    match kind {
        ZoneKind::Monster | ZoneKind::ExtraMonster => Position::FaceupAttack,
        ZoneKind::Deck | ZoneKind::ExtraDeck => Position::Facedown,
        _ => Position::Faceup,
    }
}
