//! XYZ summons and material handling.
//!
//! An XYZ Summon is a composite:
//!
//! 1. each material leaves its zone and is logged as `"Overlay"` into the
//!    destination's material pool (`ORU-n` / `ORUEMZ-n`)
//! 2. the XYZ monster moves to the destination
//! 3. the material list is attached to it
//!
//! Materials never keep materials of their own: any a material carried are
//! sent to the graveyard before it is overlaid.

use serde::{Deserialize, Serialize};

use super::catalog::{CommandType, Prepare};
use super::transfer::{restore_stripped, strip_materials, take_back, CardMemo, MoveStep, Stripped};
use super::{not_executed, CardRef, ExecContext, Step, Transition};
use crate::cards::{Materials, Position};
use crate::core::entity::CardHandle;
use crate::core::error::{DuelError, Result};
use crate::core::player::PlayerId;
use crate::core::rng::DuelRng;
use crate::log::{LogEntry, LogKind};
use crate::zones::{FieldState, ZoneAddress};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XyzSummonData {
    pub player: PlayerId,
    pub id: u32,
    pub origin_zone: ZoneAddress,
    pub zone: ZoneAddress,
    pub materials: Vec<CardRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl XyzSummonData {
    pub fn new(player: PlayerId, id: u32, origin_zone: ZoneAddress, zone: ZoneAddress, materials: Vec<CardRef>) -> Self {
        Self { player, id, origin_zone, zone, materials, position: None }
    }
}

/// Attach the card at `origin_zone` to the monster at `zone`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachMaterialData {
    pub player: PlayerId,
    pub id: u32,
    pub origin_zone: ZoneAddress,
    pub zone: ZoneAddress,
}

/// Detach material `material_index` (0-based, attach order) from the
/// monster `id` at `zone`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachMaterialData {
    pub player: PlayerId,
    pub id: u32,
    pub zone: ZoneAddress,
    pub material_index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Lifted {
    memo: CardMemo,
    materials: Materials,
    stripped: Vec<Stripped>,
}

/// Take a card out of its zone, shedding its own materials, and reset its
/// stats. The caller decides where it goes.
fn lift(
    ctx: &mut ExecContext<'_>,
    player: PlayerId,
    handle: CardHandle,
    id: u32,
    from: ZoneAddress,
) -> Result<Lifted> {
    let card = ctx.field.card(handle)?;
    let memo = CardMemo::capture(card);
    let (materials, stripped) = if card.materials.is_empty() {
        (Materials::new(), Vec::new())
    } else {
        strip_materials(ctx, handle, from, player)?
    };

    let removed = ctx.field.take_expected(id, &from)?;
    if removed != handle {
        return Err(DuelError::Integrity(format!("expected {handle} at {from}, found {removed}")));
    }
    ctx.field.card_mut(handle)?.reset_stats();
    Ok(Lifted { memo, materials, stripped })
}

/// Put a lifted card back where it came from.
fn unlift(field: &mut FieldState, handle: CardHandle, from: &ZoneAddress, lifted: Lifted) -> Result<()> {
    field.set_card(Some(handle), from)?;
    lifted.memo.restore(field.card_mut(handle)?);
    restore_stripped(field, handle, lifted.materials, &lifted.stripped)
}

/// One material leaving its zone during an XYZ Summon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayStep {
    player: PlayerId,
    handle: CardHandle,
    id: u32,
    from: ZoneAddress,
    pool: ZoneAddress,
    lifted: Option<Lifted>,
}

impl Transition for OverlayStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let lifted = lift(ctx, self.player, self.handle, self.id, self.from)?;
        ctx.log(LogEntry::zone_change(LogKind::Overlay, self.player, self.id, self.from, self.pool));
        self.lifted = Some(lifted);
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let lifted = self.lifted.take().ok_or_else(|| not_executed("overlay"))?;
        unlift(field, self.handle, &self.from, lifted)
    }
}

/// Replace a host's material list. Materials the host already carried are
/// sent to the graveyard first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetMaterialsStep {
    player: PlayerId,
    host: CardHandle,
    zone: ZoneAddress,
    materials: Materials,
    applied: Option<(Materials, Vec<Stripped>)>,
}

impl Transition for SetMaterialsStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let (prior, stripped) = strip_materials(ctx, self.host, self.zone, self.player)?;
        ctx.field.replace_materials(self.host, self.materials.clone())?;
        self.applied = Some((prior, stripped));
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let (prior, stripped) = self.applied.take().ok_or_else(|| not_executed("material change"))?;
        field.replace_materials(self.host, Materials::new())?;
        restore_stripped(field, self.host, prior, &stripped)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachStep {
    player: PlayerId,
    handle: CardHandle,
    id: u32,
    from: ZoneAddress,
    host: CardHandle,
    pool: ZoneAddress,
    applied: Option<(usize, Lifted)>,
}

impl Transition for AttachStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let lifted = lift(ctx, self.player, self.handle, self.id, self.from)?;
        let index = ctx.field.card(self.host)?.materials.len();
        ctx.field.attach_material(self.host, self.handle, None)?;
        ctx.log(LogEntry::zone_change(CommandType::AttachMaterial, self.player, self.id, self.from, self.pool));
        self.applied = Some((index, lifted));
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let (index, lifted) = self.applied.take().ok_or_else(|| not_executed("material attach"))?;
        let detached = field.detach_material(self.host, index)?;
        if detached != self.handle {
            return Err(DuelError::Integrity(format!("expected {} as material {index}", self.handle)));
        }
        unlift(field, self.handle, &self.from, lifted)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetachStep {
    player: PlayerId,
    host: CardHandle,
    index: usize,
    pool: ZoneAddress,
    applied: Option<(CardHandle, ZoneAddress, CardMemo)>,
}

impl Transition for DetachStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let material = ctx.field.detach_material(self.host, self.index)?;
        let card = ctx.field.card(material)?;
        let memo = CardMemo::capture(card);
        let id = card.id();
        let graveyard = ZoneAddress::graveyard(card.original_owner);

        let landed = ctx.field.set_card(Some(material), &graveyard)?;
        ctx.field.card_mut(material)?.position = Position::Faceup;

        ctx.log(
            LogEntry::zone_change(CommandType::DetachMaterial, self.player, id, self.pool, landed)
                .with_position(Position::Faceup),
        );
        self.applied = Some((material, landed, memo));
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let (material, landed, memo) = self.applied.take().ok_or_else(|| not_executed("material detach"))?;
        take_back(field, material, &landed)?;
        memo.restore(field.card_mut(material)?);
        field.attach_material(self.host, material, Some(self.index))
    }
}

/// The monster at `zone`, which must exist.
fn host_at(field: &FieldState, zone: &ZoneAddress) -> Result<CardHandle> {
    field
        .card_at(zone)?
        .ok_or(DuelError::CardNotFoundInZone { id: None, zone: *zone })
}

impl Prepare for XyzSummonData {
    fn prepare(&mut self, command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let pool = ZoneAddress::overlay_zone_for(self.zone)?;
        let mut children = Vec::with_capacity(self.materials.len() + 2);
        let mut handles = Materials::new();
        let mut ids = Vec::with_capacity(self.materials.len());

        for material in &self.materials {
            let handle = field.card_by_id(material.id, &material.zone)?;
            handles.push(handle);
            ids.push(material.id);
            children.push(Step::Overlay(OverlayStep {
                player: self.player,
                handle,
                id: material.id,
                from: material.zone,
                pool,
                lifted: None,
            }));
        }

        let summon = MoveStep::resolve(
            field,
            command_type,
            self.player,
            self.id,
            self.origin_zone,
            self.zone,
            Some(self.position.unwrap_or(Position::FaceupAttack)),
        )?;
        let host = field.card_by_id(self.id, &self.origin_zone)?;
        children.push(Step::Move(summon.with_log_materials(ids)));
        children.push(Step::SetMaterials(SetMaterialsStep {
            player: self.player,
            host,
            zone: self.zone,
            materials: handles,
            applied: None,
        }));

        Ok(Step::Composite(children))
    }
}

impl Prepare for AttachMaterialData {
    fn prepare(&mut self, _command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let pool = ZoneAddress::overlay_zone_for(self.zone)?;
        let host = host_at(field, &self.zone)?;
        let handle = field.card_by_id(self.id, &self.origin_zone)?;
        if handle == host {
            return Err(DuelError::InvalidZoneAddress(format!("{} cannot be its own material", self.zone)));
        }
        Ok(Step::Attach(AttachStep {
            player: self.player,
            handle,
            id: self.id,
            from: self.origin_zone,
            host,
            pool,
            applied: None,
        }))
    }
}

impl Prepare for DetachMaterialData {
    fn prepare(&mut self, _command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let pool = ZoneAddress::overlay_zone_for(self.zone)?;
        let host = field.card_by_id(self.id, &self.zone)?;
        let count = field.card(host)?.materials.len();
        if self.material_index >= count {
            return Err(DuelError::MaterialIndexOutOfRange { id: self.id, index: self.material_index, count });
        }
        Ok(Step::Detach(DetachStep { player: self.player, host, index: self.material_index, pool, applied: None }))
    }
}
