//! The duel: field state, log and command history with an undo cursor.
//!
//! Every mutating call is all-or-nothing. Before executing (or undoing, or
//! redoing) a command the duel clones the field, which is O(1) thanks to
//! persistent storage, and restores that clone if any step fails. Log
//! entries are staged while a command runs and only appended once it
//! succeeded, so a failed command never reaches subscribers.

use tracing::{debug, warn};

use super::replay::{ReplayPlacement, ReplayPlayer};
use crate::cards::Position;
use crate::commands::{Command, CommandKind};
use crate::core::config::DuelConfig;
use crate::core::entity::{CardHandle, CommandId};
use crate::core::error::{DuelError, Result};
use crate::core::player::{PlayerId, PLAYER_COUNT};
use crate::core::rng::{DuelRng, DuelRngState};
use crate::log::{DuelLog, LogEntry, LogNotice, SubscriptionId};
use crate::zones::{FieldState, ZoneAddress, ZoneKind, ZoneSnapshot};

/// A two-player duel.
///
/// ```
/// use duel_engine::cards::{CardData, CardType};
/// use duel_engine::commands::{deck::DrawData, CommandKind};
/// use duel_engine::core::{DuelConfig, PlayerConfig, PlayerId};
/// use duel_engine::engine::Duel;
///
/// let goblin = CardData::new(1, "Goblin", CardType::MONSTER | CardType::NORMAL);
/// let config = DuelConfig::new(
///     PlayerConfig::new("Yugi").with_main_deck(vec![goblin.clone(); 5]),
///     PlayerConfig::new("Kaiba").with_main_deck(vec![goblin; 5]),
/// );
///
/// let mut duel = Duel::new(config).unwrap();
/// duel.exec(CommandKind::Draw(DrawData::new(PlayerId::FIRST, 5))).unwrap();
/// assert_eq!(duel.log().len(), 5);
///
/// assert!(duel.undo().unwrap());
/// assert!(duel.log().is_empty());
/// assert!(duel.redo().unwrap());
/// assert_eq!(duel.log().len(), 5);
/// ```
#[derive(Debug)]
pub struct Duel {
    field: FieldState,
    log: DuelLog,
    rng: DuelRng,

    /// Executed commands, oldest first. Entries past `applied` are undone
    /// and can be redone until a new command is executed.
    history: Vec<Command>,
    applied: usize,
    next_id: CommandId,

    roster: Vec<ReplayPlayer>,
    starting_life_points: i64,
}

impl Duel {
    /// Build a duel from a validated config.
    ///
    /// Cards are allocated player by player, main deck then extra deck, then
    /// the initial placements in order.
    pub fn new(config: DuelConfig) -> Result<Self> {
        config.validate()?;
        let options = &config.options;
        let mut rng = DuelRng::new(options.seed);
        let mut field = FieldState::new(options.starting_life_points);
        let mut roster = Vec::with_capacity(PLAYER_COUNT);

        for (player, player_config) in PlayerId::both().zip(&config.players) {
            let len = player_config.main_deck.len();
            let order = if options.shuffle_decks {
                rng.permutation(len)
            } else {
                player_config.main_deck_order.clone().unwrap_or_else(|| (0..len).collect())
            };

            let main: Vec<CardHandle> = player_config
                .main_deck
                .iter()
                .map(|data| field.alloc_card(data.clone(), player, false))
                .collect();
            let deck = ZoneAddress::deck(player);
            for &index in &order {
                let handle = main
                    .get(index)
                    .copied()
                    .ok_or_else(|| DuelError::InvalidConfig(format!("deck index {index} out of range")))?;
                field.set_card(Some(handle), &deck)?;
            }

            let extra_deck = ZoneAddress::extra_deck(player);
            for data in &player_config.extra_deck {
                let handle = field.alloc_card(data.clone(), player, false);
                field.set_card(Some(handle), &extra_deck)?;
            }

            roster.push(ReplayPlayer {
                name: player_config.name.clone(),
                deck: player_config.main_deck.iter().map(|card| card.id).collect(),
                main_deck_order: order,
                extra_deck: player_config.extra_deck.iter().map(|card| card.id).collect(),
                field_state: Vec::new(),
            });
        }

        for placement in &options.field_state {
            let player = placement.zone.player;
            field.ensure_player(player)?;
            let handle = field.alloc_card(placement.card.clone(), player, false);
            let landed = field.set_card(Some(handle), &placement.zone)?;
            let card = field.card_mut(handle)?;
            card.position = match placement.position {
                Some(position) => position,
                None => card.default_position(ZoneKind::Hand, placement.zone.kind),
            };

            if let Some(entry) = roster.get_mut(player.index()) {
                entry.field_state.push(ReplayPlacement {
                    zone: landed,
                    id: placement.card.id,
                    position: placement.position,
                });
            }
        }

        field.verify_integrity()?;
        debug!(
            seed = options.seed,
            shuffled = options.shuffle_decks,
            cards = field.arena_len(),
            "duel created"
        );

        Ok(Self {
            field,
            log: DuelLog::new(),
            rng,
            history: Vec::new(),
            applied: 0,
            next_id: CommandId(1),
            roster,
            starting_life_points: options.starting_life_points,
        })
    }

    // === Command stack ===

    /// Execute a command, discarding any undone commands after the cursor.
    ///
    /// On failure the duel is left exactly as it was and the error returned.
    pub fn exec(&mut self, command: impl Into<Command>) -> Result<CommandId> {
        let mut command = command.into();
        let id = self.next_id;
        let field = self.field.clone();
        let rng = self.rng.clone();
        let mut entries = Vec::new();

        let result = command
            .prepare(id, &self.field, &mut self.rng)
            .and_then(|()| command.exec(&mut self.field, &mut entries));
        if let Err(err) = result {
            self.field = field;
            self.rng = rng;
            warn!(%id, command = %command.command_type(), error = %err, "command failed, duel rolled back");
            return Err(err);
        }

        let discarded = self.history.len() - self.applied;
        self.history.truncate(self.applied);
        self.history.push(command);
        self.applied = self.history.len();
        self.next_id = id.next();
        debug!(%id, entries = entries.len(), discarded, "command executed");
        self.log.extend(entries);
        Ok(id)
    }

    /// Undo the command at the cursor. Returns `false` when nothing is left
    /// to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(index) = self.applied.checked_sub(1) else {
            return Ok(false);
        };
        let field = self.field.clone();
        let command = self
            .history
            .get_mut(index)
            .ok_or_else(|| DuelError::Integrity(format!("history cursor {index} out of range")))?;
        let backup = command.clone();

        if let Err(err) = command.undo(&mut self.field) {
            self.field = field;
            *command = backup;
            warn!(command = %command.command_type(), error = %err, "undo failed, duel rolled back");
            return Err(err);
        }

        self.applied = index;
        if let Some(id) = command.id() {
            let removed = self.log.remove_command(id);
            debug!(%id, removed, "command undone");
        }
        Ok(true)
    }

    /// Re-execute the next undone command with the parameters it was first
    /// prepared with. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        let index = self.applied;
        let Some(command) = self.history.get_mut(index) else {
            return Ok(false);
        };
        let field = self.field.clone();
        let backup = command.clone();
        let mut entries = Vec::new();

        if let Err(err) = command.exec(&mut self.field, &mut entries) {
            self.field = field;
            *command = backup;
            warn!(command = %command.command_type(), error = %err, "redo failed, duel rolled back");
            return Err(err);
        }

        self.applied = index + 1;
        debug!(id = ?command.id(), entries = entries.len(), "command redone");
        self.log.extend(entries);
        Ok(true)
    }

    /// Undo or redo until `id` is the last applied command.
    pub fn go_to_command(&mut self, id: CommandId) -> Result<()> {
        let position = self
            .history
            .iter()
            .position(|command| command.id() == Some(id))
            .ok_or(DuelError::CommandNotInHistory(id))?;
        let target = position + 1;

        while self.applied > target {
            self.undo()?;
        }
        while self.applied < target {
            self.redo()?;
        }
        Ok(())
    }

    /// Undo every applied command.
    pub fn go_to_start(&mut self) -> Result<()> {
        while self.undo()? {}
        Ok(())
    }

    /// Redo every undone command.
    pub fn go_to_end(&mut self) -> Result<()> {
        while self.redo()? {}
        Ok(())
    }

    // === Accessors ===

    #[must_use]
    pub fn field(&self) -> &FieldState {
        &self.field
    }

    #[must_use]
    pub fn log(&self) -> &DuelLog {
        &self.log
    }

    /// Register a log subscriber.
    pub fn subscribe(&mut self, subscriber: impl FnMut(LogNotice<'_>) + 'static) -> SubscriptionId {
        self.log.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.log.unsubscribe(id)
    }

    /// Log entries in emission order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        self.log.entries()
    }

    /// All recorded commands, including undone ones past the cursor.
    #[must_use]
    pub fn history(&self) -> &[Command] {
        &self.history
    }

    /// Commands currently applied, oldest first.
    #[must_use]
    pub fn applied(&self) -> &[Command] {
        &self.history[..self.applied]
    }

    /// Id of the last applied command.
    #[must_use]
    pub fn cursor(&self) -> Option<CommandId> {
        self.applied().last().and_then(Command::id)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.applied < self.history.len()
    }

    /// Whether `kind` could be executed against the current field.
    #[must_use]
    pub fn is_valid(&self, kind: &CommandKind) -> bool {
        Command::new(kind.clone()).is_valid(&self.field)
    }

    /// Occupied positions of `player`'s side.
    pub fn snapshot(&self, player: PlayerId) -> Result<Vec<ZoneSnapshot>> {
        self.field.snapshot(player)
    }

    /// Position of the card at `zone`, if any.
    pub fn position_at(&self, zone: &ZoneAddress) -> Result<Option<Position>> {
        match self.field.card_at(zone)? {
            Some(handle) => Ok(Some(self.field.card(handle)?.position)),
            None => Ok(None),
        }
    }

    #[must_use]
    pub fn rng_state(&self) -> DuelRngState {
        self.rng.state()
    }

    pub(crate) fn roster(&self) -> &[ReplayPlayer] {
        &self.roster
    }

    pub(crate) fn starting_life_points(&self) -> i64 {
        self.starting_life_points
    }

    pub(crate) fn seed(&self) -> u64 {
        self.rng.seed()
    }
}
