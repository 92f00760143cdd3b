//! Life points, phases and turns.

use serde::{Deserialize, Serialize};

use super::catalog::{CommandType, Prepare};
use super::{not_executed, ExecContext, Step, Transition};
use crate::core::error::Result;
use crate::core::phase::Phase;
use crate::core::player::PlayerId;
use crate::core::rng::DuelRng;
use crate::log::LogEntry;
use crate::zones::FieldState;

/// Add `amount` (negative for damage or payment) to `player`'s life points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifePointsData {
    pub player: PlayerId,
    pub amount: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePhaseData {
    pub player: PlayerId,
    pub phase: Phase,
}

/// Start the next turn with `player` as turn player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTurnData {
    pub player: PlayerId,
}

/// Life points never drop below zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifePointsStep {
    player: PlayerId,
    amount: i64,
    prior: Option<i64>,
}

impl Transition for LifePointsStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let prior = ctx.field.life_points(self.player)?;
        ctx.field.set_life_points(self.player, prior.saturating_add(self.amount).max(0))?;
        ctx.log(LogEntry::new(CommandType::ChangeLifePoints, self.player).with_value(self.amount));
        self.prior = Some(prior);
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let prior = self.prior.take().ok_or_else(|| not_executed("life point change"))?;
        field.set_life_points(self.player, prior)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseStep {
    player: PlayerId,
    phase: Phase,
    prior: Option<Phase>,
}

impl Transition for PhaseStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        self.prior = Some(ctx.field.phase());
        ctx.field.set_phase(self.phase);
        ctx.log(LogEntry::new(CommandType::ChangePhase, self.player).with_phase(self.phase));
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let prior = self.prior.take().ok_or_else(|| not_executed("phase change"))?;
        field.set_phase(prior);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnStep {
    player: PlayerId,
    prior: Option<(u32, PlayerId, Phase)>,
}

impl Transition for TurnStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let prior = (ctx.field.turn(), ctx.field.turn_player(), ctx.field.phase());
        let turn = prior.0 + 1;
        ctx.field.set_turn(turn, self.player);
        ctx.field.set_phase(Phase::Draw);
        ctx.log(
            LogEntry::new(CommandType::NextTurn, self.player)
                .with_value(i64::from(turn))
                .with_phase(Phase::Draw),
        );
        self.prior = Some(prior);
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let (turn, player, phase) = self.prior.take().ok_or_else(|| not_executed("turn change"))?;
        field.set_turn(turn, player);
        field.set_phase(phase);
        Ok(())
    }
}

impl Prepare for LifePointsData {
    fn prepare(&mut self, _command_type: CommandType, _field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        Ok(Step::LifePoints(LifePointsStep { player: self.player, amount: self.amount, prior: None }))
    }
}

impl Prepare for ChangePhaseData {
    fn prepare(&mut self, _command_type: CommandType, _field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        Ok(Step::Phase(PhaseStep { player: self.player, phase: self.phase, prior: None }))
    }
}

impl Prepare for NextTurnData {
    fn prepare(&mut self, _command_type: CommandType, _field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        Ok(Step::Turn(TurnStep { player: self.player, prior: None }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::CommandId;

    fn run(field: &mut FieldState, step: &mut Step) -> Vec<LogEntry> {
        let mut entries = Vec::new();
        step.exec(&mut ExecContext::new(field, CommandId(5), &mut entries)).unwrap();
        entries
    }

    fn prepare(kind: &mut impl Prepare, command_type: CommandType, field: &FieldState) -> Step {
        kind.prepare(command_type, field, &mut DuelRng::new(0)).unwrap()
    }

    #[test]
    fn test_life_points_clamp_at_zero() {
        let mut field = FieldState::new(8000);
        let mut data = LifePointsData { player: PlayerId::SECOND, amount: -9000 };
        let mut step = prepare(&mut data, CommandType::ChangeLifePoints, &field);

        let entries = run(&mut field, &mut step);
        assert_eq!(field.life_points(PlayerId::SECOND).unwrap(), 0);
        assert_eq!(field.life_points(PlayerId::FIRST).unwrap(), 8000);
        assert_eq!(entries[0].value, Some(-9000));

        step.undo(&mut field).unwrap();
        assert_eq!(field.life_points(PlayerId::SECOND).unwrap(), 8000);
    }

    #[test]
    fn test_change_phase() {
        let mut field = FieldState::new(8000);
        let mut data = ChangePhaseData { player: PlayerId::FIRST, phase: Phase::Battle };
        let mut step = prepare(&mut data, CommandType::ChangePhase, &field);

        let entries = run(&mut field, &mut step);
        assert_eq!(field.phase(), Phase::Battle);
        assert_eq!(entries[0].phase, Some(Phase::Battle));

        step.undo(&mut field).unwrap();
        assert_eq!(field.phase(), Phase::Draw);
    }

    #[test]
    fn test_next_turn() {
        let mut field = FieldState::new(8000);
        field.set_phase(Phase::End);
        let before = field.clone();

        let mut data = NextTurnData { player: PlayerId::SECOND };
        let mut step = prepare(&mut data, CommandType::NextTurn, &field);
        let entries = run(&mut field, &mut step);

        assert_eq!(field.turn(), 2);
        assert_eq!(field.turn_player(), PlayerId::SECOND);
        assert_eq!(field.phase(), Phase::Draw);
        assert_eq!(entries[0].value, Some(2));

        step.undo(&mut field).unwrap();
        assert_eq!(field, before);
    }
}
