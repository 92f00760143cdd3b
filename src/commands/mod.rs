//! Commands: reversible, loggable units of duel mutation.
//!
//! A `Command` goes through three stages:
//!
//! 1. **Constructed**: holds only plain intent data (`CommandKind`): ids and
//!    zone addresses, never handles. This is what gets serialized.
//! 2. **Prepared**: the command stack assigns a `CommandId` and resolves the
//!    intent against the current field into a `Step` tree, capturing every
//!    state-dependent parameter (deck insertion index, mill addresses,
//!    shuffle swaps, drawn cards).
//! 3. **Executed / undone**: the step tree is applied and reverted. Redo
//!    re-applies the same steps without preparing again.
//!
//! Composite commands (tribute summons, XYZ summons, mills) are a
//! `Step::Composite` holding their sub-steps in execution order. Undo walks
//! that list backwards. Every entry a sub-step logs carries the root
//! command's id.

pub mod catalog;
pub mod card_state;
pub mod deck;
pub mod duel_state;
pub mod summon;
pub mod transfer;
pub mod xyz;

pub use catalog::{CommandKind, CommandType, SerializedCommand};

use serde::{Deserialize, Serialize};

use crate::core::entity::CommandId;
use crate::core::error::{DuelError, Result};
use crate::core::player::PlayerId;
use crate::core::rng::DuelRng;
use crate::log::LogEntry;
use crate::zones::{FieldState, ZoneAddress};

use card_state::{AnnounceStep, PositionStep, RemoveTokenStep, StatsStep, TokenStep};
use deck::{DrawStep, ShuffleStep};
use duel_state::{LifePointsStep, PhaseStep, TurnStep};
use transfer::MoveStep;
use xyz::{AttachStep, DetachStep, OverlayStep, SetMaterialsStep};

/// Mutable view handed to steps while executing.
pub struct ExecContext<'a> {
    pub field: &'a mut FieldState,
    command_id: CommandId,
    entries: &'a mut Vec<LogEntry>,
}

impl<'a> ExecContext<'a> {
    pub fn new(field: &'a mut FieldState, command_id: CommandId, entries: &'a mut Vec<LogEntry>) -> Self {
        Self { field, command_id, entries }
    }

    /// Id every entry of this execution is tagged with.
    #[must_use]
    pub fn command_id(&self) -> CommandId {
        self.command_id
    }

    /// Record a log entry under the root command id.
    pub fn log(&mut self, mut entry: LogEntry) {
        entry.command_id = self.command_id;
        self.entries.push(entry);
    }
}

/// A forward/backward state transition.
///
/// `exec` may record what it overwrote so that `undo` can restore it
/// exactly. `undo` is only called after a successful `exec`.
pub trait Transition {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()>;

    fn undo(&mut self, field: &mut FieldState) -> Result<()>;
}

/// Resolved form of a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Move(MoveStep),
    Overlay(OverlayStep),
    SetMaterials(SetMaterialsStep),
    Attach(AttachStep),
    Detach(DetachStep),
    Draw(DrawStep),
    Shuffle(ShuffleStep),
    Position(PositionStep),
    Stats(StatsStep),
    Announce(AnnounceStep),
    CreateToken(TokenStep),
    RemoveToken(RemoveTokenStep),
    LifePoints(LifePointsStep),
    Phase(PhaseStep),
    Turn(TurnStep),
    /// Sub-steps in execution order.
    Composite(Vec<Step>),
}

impl Transition for Step {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        match self {
            Step::Move(step) => step.exec(ctx),
            Step::Overlay(step) => step.exec(ctx),
            Step::SetMaterials(step) => step.exec(ctx),
            Step::Attach(step) => step.exec(ctx),
            Step::Detach(step) => step.exec(ctx),
            Step::Draw(step) => step.exec(ctx),
            Step::Shuffle(step) => step.exec(ctx),
            Step::Position(step) => step.exec(ctx),
            Step::Stats(step) => step.exec(ctx),
            Step::Announce(step) => step.exec(ctx),
            Step::CreateToken(step) => step.exec(ctx),
            Step::RemoveToken(step) => step.exec(ctx),
            Step::LifePoints(step) => step.exec(ctx),
            Step::Phase(step) => step.exec(ctx),
            Step::Turn(step) => step.exec(ctx),
            Step::Composite(children) => {
                for child in children.iter_mut() {
                    child.exec(ctx)?;
                }
                Ok(())
            }
        }
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        match self {
            Step::Move(step) => step.undo(field),
            Step::Overlay(step) => step.undo(field),
            Step::SetMaterials(step) => step.undo(field),
            Step::Attach(step) => step.undo(field),
            Step::Detach(step) => step.undo(field),
            Step::Draw(step) => step.undo(field),
            Step::Shuffle(step) => step.undo(field),
            Step::Position(step) => step.undo(field),
            Step::Stats(step) => step.undo(field),
            Step::Announce(step) => step.undo(field),
            Step::CreateToken(step) => step.undo(field),
            Step::RemoveToken(step) => step.undo(field),
            Step::LifePoints(step) => step.undo(field),
            Step::Phase(step) => step.undo(field),
            Step::Turn(step) => step.undo(field),
            Step::Composite(children) => {
                for child in children.iter_mut().rev() {
                    child.undo(field)?;
                }
                Ok(())
            }
        }
    }
}

/// A card named by passcode and address, as submitted by a caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardRef {
    pub id: u32,
    pub zone: ZoneAddress,
}

impl CardRef {
    pub fn new(id: u32, zone: ZoneAddress) -> Self {
        Self { id, zone }
    }
}

/// A duel command.
///
/// ```
/// use duel_engine::commands::{Command, CommandKind, CommandType};
/// use duel_engine::commands::deck::DrawData;
/// use duel_engine::core::PlayerId;
///
/// let draw = Command::new(CommandKind::Draw(DrawData::new(PlayerId::FIRST, 2)));
/// assert_eq!(draw.command_type(), CommandType::Draw);
/// assert!(draw.id().is_none());
///
/// let record = draw.to_serialized().unwrap();
/// assert_eq!(record.command_type, "Draw");
/// assert_eq!(Command::from_serialized(&record).unwrap().kind(), draw.kind());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    id: Option<CommandId>,
    kind: CommandKind,
    step: Option<Step>,
}

impl Command {
    /// Create an unprepared command from intent data.
    #[must_use]
    pub fn new(kind: CommandKind) -> Self {
        Self { id: None, kind, step: None }
    }

    /// Rebuild a command from its `{type, data}` record.
    pub fn from_serialized(record: &SerializedCommand) -> Result<Self> {
        Ok(Self::new(CommandKind::decode(&record.command_type, record.data.clone())?))
    }

    /// `{type, data}` record of this command.
    pub fn to_serialized(&self) -> Result<SerializedCommand> {
        self.kind.encode()
    }

    /// Id assigned on first execution.
    #[must_use]
    pub fn id(&self) -> Option<CommandId> {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    #[must_use]
    pub fn command_type(&self) -> CommandType {
        self.kind.command_type()
    }

    /// Player issuing the command.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.kind.player()
    }

    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.step.is_some()
    }

    /// Whether the command could be prepared against `field`: its player
    /// exists and every card it names is where it says. Game rules are not
    /// checked.
    #[must_use]
    pub fn is_valid(&self, field: &FieldState) -> bool {
        let mut scratch = self.kind.clone();
        scratch.prepare(field, &mut DuelRng::new(0)).is_ok()
    }

    /// Assign `id` and resolve the intent against `field`.
    pub(crate) fn prepare(&mut self, id: CommandId, field: &FieldState, rng: &mut DuelRng) -> Result<()> {
        let step = self.kind.prepare(field, rng)?;
        self.id = Some(id);
        self.step = Some(step);
        Ok(())
    }

    /// Apply the prepared step, appending log entries to `entries`.
    pub(crate) fn exec(&mut self, field: &mut FieldState, entries: &mut Vec<LogEntry>) -> Result<()> {
        let id = self.id.ok_or_else(|| self.unprepared())?;
        let step = self.step.as_mut().ok_or_else(|| DuelError::Integrity(format!("{id} is not prepared")))?;
        step.exec(&mut ExecContext::new(field, id, entries))
    }

    /// Revert the prepared step.
    pub(crate) fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        match self.step.as_mut() {
            Some(step) => step.undo(field),
            None => Err(self.unprepared()),
        }
    }

    fn unprepared(&self) -> DuelError {
        DuelError::Integrity(format!("{} command was never prepared", self.command_type()))
    }
}

impl From<CommandKind> for Command {
    fn from(kind: CommandKind) -> Self {
        Self::new(kind)
    }
}

/// Error for a step undone before it was executed.
pub(crate) fn not_executed(what: &str) -> DuelError {
    DuelError::Integrity(format!("{what} undone before it was executed"))
}
