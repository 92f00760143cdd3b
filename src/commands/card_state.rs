//! Commands that change a card in place, announce something about it, or
//! create and remove tokens.

use serde::{Deserialize, Serialize};

use super::catalog::{CommandType, Prepare};
use super::transfer::{ensure_destination, take_back};
use super::{not_executed, ExecContext, Step, Transition};
use crate::cards::{Card, CardData, Position};
use crate::core::entity::CardHandle;
use crate::core::error::{DuelError, Result};
use crate::core::player::PlayerId;
use crate::core::rng::DuelRng;
use crate::log::LogEntry;
use crate::zones::{FieldState, ZoneAddress};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePositionData {
    pub player: PlayerId,
    pub id: u32,
    pub zone: ZoneAddress,
    pub position: Position,
}

/// Override displayed ATK/DEF. `None` clears an override.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatsData {
    pub player: PlayerId,
    pub id: u32,
    pub zone: ZoneAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atk: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def: Option<i32>,
}

/// Attack with the monster at `zone`; no target means a direct attack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclareAttackData {
    pub player: PlayerId,
    pub id: u32,
    pub zone: ZoneAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_zone: Option<ZoneAddress>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenData {
    pub player: PlayerId,
    pub zone: ZoneAddress,
    pub token: CardData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRefData {
    pub player: PlayerId,
    pub id: u32,
    pub zone: ZoneAddress,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionStep {
    player: PlayerId,
    handle: CardHandle,
    id: u32,
    zone: ZoneAddress,
    position: Position,
    prior: Option<Position>,
}

impl Transition for PositionStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let card = ctx.field.card_mut(self.handle)?;
        self.prior = Some(std::mem::replace(&mut card.position, self.position));
        ctx.log(
            LogEntry::new(CommandType::ChangePosition, self.player)
                .with_card(self.id)
                .with_zone(self.zone)
                .with_position(self.position),
        );
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let prior = self.prior.take().ok_or_else(|| not_executed("position change"))?;
        field.card_mut(self.handle)?.position = prior;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsStep {
    player: PlayerId,
    handle: CardHandle,
    id: u32,
    zone: ZoneAddress,
    atk: Option<i32>,
    def: Option<i32>,
    prior: Option<(Option<i32>, Option<i32>)>,
}

impl Transition for StatsStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let card = ctx.field.card_mut(self.handle)?;
        let prior = (card.current_atk, card.current_def);
        card.current_atk = self.atk;
        card.current_def = self.def;
        let shown = (card.atk(), card.def());

        ctx.log(
            LogEntry::new(CommandType::ChangeStats, self.player)
                .with_card(self.id)
                .with_zone(self.zone)
                .with_stats(shown.0, shown.1),
        );
        self.prior = Some(prior);
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let (atk, def) = self.prior.take().ok_or_else(|| not_executed("stat change"))?;
        let card = field.card_mut(self.handle)?;
        card.current_atk = atk;
        card.current_def = def;
        Ok(())
    }
}

/// A log-only command: Reveal or Declare Attack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnounceStep {
    command_type: CommandType,
    player: PlayerId,
    id: u32,
    origin: ZoneAddress,
    target: Option<ZoneAddress>,
}

impl AnnounceStep {
    pub fn new(
        command_type: CommandType,
        player: PlayerId,
        id: u32,
        origin: ZoneAddress,
        target: Option<ZoneAddress>,
    ) -> Self {
        Self { command_type, player, id, origin, target }
    }
}

impl Transition for AnnounceStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        ctx.field.card_by_id(self.id, &self.origin)?;
        let mut entry = LogEntry::new(self.command_type, self.player)
            .with_card(self.id)
            .with_origin(self.origin);
        if let Some(target) = self.target {
            entry = entry.with_zone(target);
        }
        ctx.log(entry);
        Ok(())
    }

    fn undo(&mut self, _field: &mut FieldState) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenStep {
    player: PlayerId,
    zone: ZoneAddress,
    data: CardData,
    position: Position,
    placed: Option<(CardHandle, ZoneAddress)>,
}

impl Transition for TokenStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let handle = ctx.field.alloc_card(self.data.clone(), self.zone.player, true);
        let landed = ctx.field.set_card(Some(handle), &self.zone)?;
        ctx.field.card_mut(handle)?.position = self.position;

        ctx.log(
            LogEntry::new(CommandType::CreateToken, self.player)
                .with_card(self.data.id)
                .with_zone(landed)
                .with_position(self.position),
        );
        self.placed = Some((handle, landed));
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let (handle, landed) = self.placed.take().ok_or_else(|| not_executed("token creation"))?;
        take_back(field, handle, &landed)?;
        field.free_last_card(handle)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveTokenStep {
    player: PlayerId,
    handle: CardHandle,
    id: u32,
    zone: ZoneAddress,
    removed: Option<Card>,
}

impl Transition for RemoveTokenStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        take_back(ctx.field, self.handle, &self.zone)?;
        let card = ctx.field.take_card(self.handle)?;
        ctx.log(
            LogEntry::new(CommandType::RemoveToken, self.player)
                .with_card(self.id)
                .with_origin(self.zone),
        );
        self.removed = Some(card);
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let card = self.removed.take().ok_or_else(|| not_executed("token removal"))?;
        field.restore_card(card)?;
        field.set_card(Some(self.handle), &self.zone)?;
        Ok(())
    }
}

impl Prepare for ChangePositionData {
    fn prepare(&mut self, _command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let handle = field.card_by_id(self.id, &self.zone)?;
        Ok(Step::Position(PositionStep {
            player: self.player,
            handle,
            id: self.id,
            zone: self.zone,
            position: self.position,
            prior: None,
        }))
    }
}

impl Prepare for ChangeStatsData {
    fn prepare(&mut self, _command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let handle = field.card_by_id(self.id, &self.zone)?;
        Ok(Step::Stats(StatsStep {
            player: self.player,
            handle,
            id: self.id,
            zone: self.zone,
            atk: self.atk,
            def: self.def,
            prior: None,
        }))
    }
}

impl Prepare for DeclareAttackData {
    fn prepare(&mut self, command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        field.card_by_id(self.id, &self.zone)?;
        if let Some(target) = &self.target_zone {
            if field.card_at(target)?.is_none() {
                return Err(DuelError::CardNotFoundInZone { id: None, zone: *target });
            }
        }
        Ok(Step::Announce(AnnounceStep::new(command_type, self.player, self.id, self.zone, self.target_zone)))
    }
}

impl Prepare for CreateTokenData {
    fn prepare(&mut self, _command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        ensure_destination(field, &self.zone)?;
        Ok(Step::CreateToken(TokenStep {
            player: self.player,
            zone: self.zone,
            data: self.token.clone(),
            position: self.position.unwrap_or(Position::FaceupAttack),
            placed: None,
        }))
    }
}

impl Prepare for TokenRefData {
    fn prepare(&mut self, _command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let handle = field.card_by_id(self.id, &self.zone)?;
        if !field.card(handle)?.is_token {
            return Err(DuelError::NotAToken(self.id));
        }
        Ok(Step::RemoveToken(RemoveTokenStep {
            player: self.player,
            handle,
            id: self.id,
            zone: self.zone,
            removed: None,
        }))
    }
}
