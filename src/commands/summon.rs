//! Placements from hand (or any zone) onto the field.
//!
//! Normal Summon, Set Monster, Activate and Set Spell/Trap are single moves
//! with a fixed position. Tribute Summon and Tribute Set first send each
//! tribute to its original owner's graveyard, then place the card.

use serde::{Deserialize, Serialize};

use super::catalog::{CommandType, Prepare};
use super::transfer::MoveStep;
use super::{CardRef, Step};
use crate::cards::Position;
use crate::core::error::{DuelError, Result};
use crate::core::player::PlayerId;
use crate::core::rng::DuelRng;
use crate::zones::{FieldState, ZoneAddress};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementData {
    pub player: PlayerId,
    pub id: u32,
    pub origin_zone: ZoneAddress,
    pub zone: ZoneAddress,
}

impl PlacementData {
    pub fn new(player: PlayerId, id: u32, origin_zone: ZoneAddress, zone: ZoneAddress) -> Self {
        Self { player, id, origin_zone, zone }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TributeData {
    pub player: PlayerId,
    pub id: u32,
    pub origin_zone: ZoneAddress,
    pub zone: ZoneAddress,
    pub tributes: Vec<CardRef>,
}

impl TributeData {
    pub fn new(player: PlayerId, id: u32, origin_zone: ZoneAddress, zone: ZoneAddress, tributes: Vec<CardRef>) -> Self {
        Self { player, id, origin_zone, zone, tributes }
    }
}

fn placement_position(command_type: CommandType) -> Result<Position> {
    match command_type {
        CommandType::NormalSummon | CommandType::TributeSummon => Ok(Position::FaceupAttack),
        CommandType::SetMonster | CommandType::TributeSet | CommandType::SetSpellTrap => Ok(Position::Facedown),
        CommandType::Activate => Ok(Position::Faceup),
        other => Err(DuelError::Integrity(format!("{other} is not a placement"))),
    }
}

impl Prepare for PlacementData {
    fn prepare(&mut self, command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let position = placement_position(command_type)?;
        let step = MoveStep::resolve(field, command_type, self.player, self.id, self.origin_zone, self.zone, Some(position))?;
        Ok(Step::Move(step))
    }
}

impl Prepare for TributeData {
    fn prepare(&mut self, command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let position = placement_position(command_type)?;
        let mut children = Vec::with_capacity(self.tributes.len() + 1);

        for tribute in &self.tributes {
            let handle = field.card_by_id(tribute.id, &tribute.zone)?;
            let graveyard = ZoneAddress::graveyard(field.card(handle)?.original_owner);
            children.push(Step::Move(MoveStep::new(
                CommandType::SendToGy,
                self.player,
                handle,
                tribute.id,
                tribute.zone,
                graveyard,
                None,
            )));
        }

        // The destination may be held by a tribute until it leaves, so only
        // the summoned card is resolved here.
        children.push(Step::Move(MoveStep::resolve(
            field,
            command_type,
            self.player,
            self.id,
            self.origin_zone,
            self.zone,
            Some(position),
        )?));

        Ok(Step::Composite(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardData, CardType};
    use crate::commands::{ExecContext, Transition};
    use crate::core::entity::{CardHandle, CommandId};
    use crate::log::{LogEntry, LogKind};

    const P0: PlayerId = PlayerId::FIRST;

    fn addr(s: &str) -> ZoneAddress {
        s.parse().unwrap()
    }

    fn place(field: &mut FieldState, id: u32, at: &str) -> CardHandle {
        let handle = field.alloc_card(CardData::new(id, format!("#{id}"), CardType::MONSTER), P0, false);
        field.set_card(Some(handle), &addr(at)).unwrap();
        handle
    }

    fn run(field: &mut FieldState, step: &mut Step) -> Vec<LogEntry> {
        let mut entries = Vec::new();
        step.exec(&mut ExecContext::new(field, CommandId(4), &mut entries)).unwrap();
        entries
    }

    #[test]
    fn test_placement_positions() {
        let cases = [
            (CommandType::NormalSummon, "M-1", Position::FaceupAttack),
            (CommandType::SetMonster, "M-2", Position::Facedown),
            (CommandType::Activate, "S-1", Position::Faceup),
            (CommandType::SetSpellTrap, "S-2", Position::Facedown),
        ];
        for (command_type, zone, expected) in cases {
            let mut field = FieldState::new(8000);
            let h = place(&mut field, 1, "H");
            let mut data = PlacementData::new(P0, 1, addr("H-1"), addr(zone));
            let mut step = data.prepare(command_type, &field, &mut DuelRng::new(0)).unwrap();
            let entries = run(&mut field, &mut step);

            assert_eq!(field.card_at(&addr(zone)).unwrap(), Some(h));
            assert_eq!(field.card(h).unwrap().position, expected);
            assert_eq!(entries[0].position, Some(expected));
        }
    }

    #[test]
    fn test_summon_into_occupied_zone_fails() {
        let mut field = FieldState::new(8000);
        place(&mut field, 1, "H");
        place(&mut field, 2, "M-1");

        let mut data = PlacementData::new(P0, 1, addr("H-1"), addr("M-1"));
        let mut step = data.prepare(CommandType::NormalSummon, &field, &mut DuelRng::new(0)).unwrap();
        let mut entries = Vec::new();
        let err = step.exec(&mut ExecContext::new(&mut field, CommandId(1), &mut entries)).unwrap_err();
        assert!(matches!(err, DuelError::ZoneOccupied(_)));
    }

    #[test]
    fn test_tribute_summon_into_tribute_zone() {
        let mut field = FieldState::new(8000);
        let boss = place(&mut field, 100, "H");
        let fodder = place(&mut field, 5, "M-1");
        let before = field.clone();

        let mut data = TributeData::new(P0, 100, addr("H-1"), addr("M-1"), vec![CardRef::new(5, addr("M-1"))]);
        let mut step = data.prepare(CommandType::TributeSummon, &field, &mut DuelRng::new(0)).unwrap();
        let entries = run(&mut field, &mut step);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, LogKind::Command(CommandType::SendToGy));
        assert_eq!(entries[1].kind, LogKind::Command(CommandType::TributeSummon));
        assert!(entries.iter().all(|e| e.command_id == CommandId(4)));
        assert_eq!(field.card_at(&addr("M-1")).unwrap(), Some(boss));
        assert_eq!(field.card_at(&addr("GY-1")).unwrap(), Some(fodder));

        step.undo(&mut field).unwrap();
        assert_eq!(field, before);
    }

    #[test]
    fn test_tribute_set_is_facedown() {
        let mut field = FieldState::new(8000);
        let boss = place(&mut field, 100, "H");
        place(&mut field, 5, "M-1");
        place(&mut field, 6, "M-2");

        let tributes = vec![CardRef::new(5, addr("M-1")), CardRef::new(6, addr("M-2"))];
        let mut data = TributeData::new(P0, 100, addr("H-1"), addr("M-3"), tributes);
        let mut step = data.prepare(CommandType::TributeSet, &field, &mut DuelRng::new(0)).unwrap();
        run(&mut field, &mut step);

        assert_eq!(field.card(boss).unwrap().position, Position::Facedown);
        assert_eq!(field.pile_len(crate::zones::ZoneKind::Graveyard, P0).unwrap(), 2);
    }

    #[test]
    fn test_tribute_must_be_present() {
        let mut field = FieldState::new(8000);
        place(&mut field, 100, "H");
        let mut data = TributeData::new(P0, 100, addr("H-1"), addr("M-1"), vec![CardRef::new(5, addr("M-2"))]);
        let err = data.prepare(CommandType::TributeSummon, &field, &mut DuelRng::new(0)).unwrap_err();
        assert!(matches!(err, DuelError::CardNotFoundInZone { id: Some(5), .. }));
    }
}
