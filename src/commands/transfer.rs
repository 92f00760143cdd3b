//! Zone transfers: the Move Card primitive and the commands built on it.
//!
//! | Command | Destination |
//! |---|---|
//! | Move Card, Special Summon | given zone |
//! | Send To GY | original owner's graveyard (position 1) |
//! | Banish | original owner's banished zone (position 1) |
//! | To Hand | end of the original owner's hand |
//! | To Deck | top or bottom of the original owner's deck; extra deck for extra deck cards |
//! | To Extra Deck | original owner's extra deck, sorted |
//!
//! Pile indices are resolved when the command is prepared, so the command
//! replays identically even if the pile has changed since it was built.

use serde::{Deserialize, Serialize};

use super::card_state::AnnounceStep;
use super::catalog::{CommandType, Prepare};
use super::{not_executed, ExecContext, Step, Transition};
use crate::cards::{Card, DeckPosition, Materials, Position};
use crate::core::entity::CardHandle;
use crate::core::error::{DuelError, Result};
use crate::core::player::PlayerId;
use crate::core::rng::DuelRng;
use crate::log::{LogEntry, LogKind};
use crate::zones::{FieldState, ZoneAddress, ZoneKind};

/// Data for Move Card and Special Summon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardData {
    pub player: PlayerId,
    pub id: u32,
    pub origin_zone: ZoneAddress,
    pub zone: ZoneAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl MoveCardData {
    pub fn new(player: PlayerId, id: u32, origin_zone: ZoneAddress, zone: ZoneAddress) -> Self {
        Self { player, id, origin_zone, zone, position: None }
    }

    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

/// Data for commands that only name a card: Send To GY, To Hand,
/// To Extra Deck, Reveal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceData {
    pub player: PlayerId,
    pub id: u32,
    pub origin_zone: ZoneAddress,
}

impl SourceData {
    pub fn new(player: PlayerId, id: u32, origin_zone: ZoneAddress) -> Self {
        Self { player, id, origin_zone }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanishData {
    pub player: PlayerId,
    pub id: u32,
    pub origin_zone: ZoneAddress,
    #[serde(default)]
    pub facedown: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToDeckData {
    pub player: PlayerId,
    pub id: u32,
    pub origin_zone: ZoneAddress,
    #[serde(default)]
    pub deck_position: DeckPosition,
}

/// Card attributes a transfer may overwrite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardMemo {
    position: Position,
    current_atk: Option<i32>,
    current_def: Option<i32>,
    owner: PlayerId,
}

impl CardMemo {
    pub fn capture(card: &Card) -> Self {
        Self {
            position: card.position,
            current_atk: card.current_atk,
            current_def: card.current_def,
            owner: card.owner,
        }
    }

    pub fn restore(&self, card: &mut Card) {
        card.position = self.position;
        card.current_atk = self.current_atk;
        card.current_def = self.current_def;
        card.owner = self.owner;
    }
}

/// A material sent to the graveyard when its host left the monster zones or
/// took a new material list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stripped {
    handle: CardHandle,
    landed: ZoneAddress,
    memo: CardMemo,
}

/// Send every material of `host` (sitting in `host_zone`) to its original
/// owner's graveyard, one log entry each. Returns the detached list and
/// where each material landed.
pub fn strip_materials(
    ctx: &mut ExecContext<'_>,
    host: CardHandle,
    host_zone: ZoneAddress,
    player: PlayerId,
) -> Result<(Materials, Vec<Stripped>)> {
    let materials = ctx.field.replace_materials(host, Materials::new())?;
    let pool = ZoneAddress::overlay_zone_for(host_zone).unwrap_or(host_zone);
    let mut stripped = Vec::with_capacity(materials.len());

    for &material in &materials {
        let card = ctx.field.card(material)?;
        let memo = CardMemo::capture(card);
        let id = card.id();
        let graveyard = ZoneAddress::graveyard(card.original_owner);

        let landed = ctx.field.set_card(Some(material), &graveyard)?;
        let card = ctx.field.card_mut(material)?;
        card.position = Position::Faceup;
        card.reset_stats();

        ctx.log(
            LogEntry::zone_change(CommandType::SendToGy, player, id, pool, landed).with_position(Position::Faceup),
        );
        stripped.push(Stripped { handle: material, landed, memo });
    }

    Ok((materials, stripped))
}

/// Undo `strip_materials`: pull the materials back out of the graveyard
/// and reattach the original list.
pub fn restore_stripped(field: &mut FieldState, host: CardHandle, materials: Materials, stripped: &[Stripped]) -> Result<()> {
    if stripped.is_empty() {
        return Ok(());
    }
    for entry in stripped.iter().rev() {
        take_back(field, entry.handle, &entry.landed)?;
        entry.memo.restore(field.card_mut(entry.handle)?);
    }
    field.replace_materials(host, materials)?;
    Ok(())
}

/// Remove `handle` from `zone`, failing if a different card is there.
pub fn take_back(field: &mut FieldState, handle: CardHandle, zone: &ZoneAddress) -> Result<()> {
    let removed = field.remove_card(zone)?;
    if removed == handle {
        Ok(())
    } else {
        Err(DuelError::Integrity(format!("expected {handle} at {zone}, found {removed}")))
    }
}

/// Check a destination can hold cards.
pub fn ensure_destination(field: &FieldState, zone: &ZoneAddress) -> Result<()> {
    field.ensure_player(zone.player)?;
    if zone.kind.is_overlay() {
        return Err(DuelError::InvalidZoneAddress(format!("{zone} cannot be a destination")));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Applied {
    landed: ZoneAddress,
    memo: CardMemo,
    materials: Materials,
    stripped: Vec<Stripped>,
}

/// Move one card between two addresses.
///
/// - materials are stripped first when the destination is not a monster zone
/// - the card's owner becomes the destination player
/// - ATK/DEF overrides are cleared when the card leaves the field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveStep {
    kind: LogKind,
    player: PlayerId,
    handle: CardHandle,
    id: u32,
    from: ZoneAddress,
    to: ZoneAddress,
    position: Option<Position>,
    log_materials: Vec<u32>,
    applied: Option<Applied>,
}

impl MoveStep {
    pub fn new(
        kind: impl Into<LogKind>,
        player: PlayerId,
        handle: CardHandle,
        id: u32,
        from: ZoneAddress,
        to: ZoneAddress,
        position: Option<Position>,
    ) -> Self {
        Self {
            kind: kind.into(),
            player,
            handle,
            id,
            from,
            to,
            position,
            log_materials: Vec::new(),
            applied: None,
        }
    }

    /// Passcodes reported in the log entry's `materials` field.
    #[must_use]
    pub fn with_log_materials(mut self, materials: Vec<u32>) -> Self {
        self.log_materials = materials;
        self
    }

    /// Resolve the card named by `id` at `from`.
    pub fn resolve(
        field: &FieldState,
        kind: impl Into<LogKind>,
        player: PlayerId,
        id: u32,
        from: ZoneAddress,
        to: ZoneAddress,
        position: Option<Position>,
    ) -> Result<Self> {
        let handle = field.card_by_id(id, &from)?;
        ensure_destination(field, &to)?;
        Ok(Self::new(kind, player, handle, id, from, to, position))
    }
}

impl Transition for MoveStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let card = ctx.field.card(self.handle)?;
        let memo = CardMemo::capture(card);
        let (materials, stripped) = if !card.materials.is_empty() && !self.to.kind.is_monster_zone() {
            strip_materials(ctx, self.handle, self.from, self.player)?
        } else {
            (Materials::new(), Vec::new())
        };

        let landed = ctx.field.move_card(self.handle, &self.from, &self.to)?;

        let card = ctx.field.card_mut(self.handle)?;
        let position = match self.position {
            Some(position) => position,
            None => card.default_position(self.from.kind, self.to.kind),
        };
        card.position = position;
        if !self.to.kind.is_on_field() {
            card.reset_stats();
        }

        ctx.log(
            LogEntry::zone_change(self.kind, self.player, self.id, self.from, landed)
                .with_position(position)
                .with_materials(self.log_materials.clone()),
        );
        self.applied = Some(Applied { landed, memo, materials, stripped });
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let applied = self.applied.take().ok_or_else(|| not_executed("card move"))?;
        field.move_card(self.handle, &applied.landed, &self.from)?;
        applied.memo.restore(field.card_mut(self.handle)?);
        restore_stripped(field, self.handle, applied.materials, &applied.stripped)
    }
}

impl Prepare for MoveCardData {
    fn prepare(&mut self, command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let position = match command_type {
            CommandType::SpecialSummon => Some(self.position.unwrap_or(Position::FaceupAttack)),
            _ => self.position,
        };
        let step = MoveStep::resolve(field, command_type, self.player, self.id, self.origin_zone, self.zone, position)?;
        Ok(Step::Move(step))
    }
}

impl Prepare for SourceData {
    fn prepare(&mut self, command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let handle = field.card_by_id(self.id, &self.origin_zone)?;
        let owner = field.card(handle)?.original_owner;

        let to = match command_type {
            CommandType::SendToGy => ZoneAddress::graveyard(owner),
            CommandType::ToHand => {
                let len = field.pile_len(ZoneKind::Hand, owner)?;
                let same_pile = self.origin_zone.kind == ZoneKind::Hand && self.origin_zone.player == owner;
                ZoneAddress::hand(owner).with_index(len + usize::from(!same_pile))
            }
            CommandType::ToExtraDeck => ZoneAddress::extra_deck(owner),
            CommandType::Reveal => {
                return Ok(Step::Announce(AnnounceStep::new(
                    CommandType::Reveal,
                    self.player,
                    self.id,
                    self.origin_zone,
                    None,
                )));
            }
            other => {
                return Err(DuelError::Integrity(format!("{other} does not take a source card")));
            }
        };

        Ok(Step::Move(MoveStep::new(
            command_type,
            self.player,
            handle,
            self.id,
            self.origin_zone,
            to,
            None,
        )))
    }
}

impl Prepare for BanishData {
    fn prepare(&mut self, command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let handle = field.card_by_id(self.id, &self.origin_zone)?;
        let owner = field.card(handle)?.original_owner;
        let position = if self.facedown { Position::Facedown } else { Position::Faceup };
        Ok(Step::Move(MoveStep::new(
            command_type,
            self.player,
            handle,
            self.id,
            self.origin_zone,
            ZoneAddress::banished(owner),
            Some(position),
        )))
    }
}

impl Prepare for ToDeckData {
    fn prepare(&mut self, command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let handle = field.card_by_id(self.id, &self.origin_zone)?;
        let card = field.card(handle)?;
        let owner = card.original_owner;

        let to = if !card.is_main_deck_card {
            ZoneAddress::extra_deck(owner)
        } else {
            match self.deck_position {
                DeckPosition::Top => {
                    let len = field.pile_len(ZoneKind::Deck, owner)?;
                    let same_pile = self.origin_zone.kind == ZoneKind::Deck && self.origin_zone.player == owner;
                    ZoneAddress::deck_slot(owner, len + usize::from(!same_pile))
                }
                DeckPosition::Bottom => ZoneAddress::deck_slot(owner, 1),
            }
        };

        Ok(Step::Move(MoveStep::new(
            command_type,
            self.player,
            handle,
            self.id,
            self.origin_zone,
            to,
            None,
        )))
    }
}
