//! Replay export and reconstruction.
//!
//! A replay carries passcodes only. Rebuilding a duel from it needs a
//! `CardDatabase` to turn those back into card data; decks are rebuilt in
//! the recorded order, so the duel RNG is never consulted for them.
//! Shuffle commands carry their swap sequences, so re-execution is exact.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::duel::Duel;
use crate::cards::{CardDatabase, Position};
use crate::commands::{Command, SerializedCommand};
use crate::core::config::{DuelConfig, DuelOptions, PlayerConfig};
use crate::core::error::{DuelError, Result};
use crate::core::player::{PlayerId, PLAYER_COUNT};
use crate::zones::{ZoneAddress, ZoneSnapshot};

/// Everything needed to reproduce a duel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayData {
    pub players: Vec<ReplayPlayer>,
    pub seed: u64,
    pub starting_life_points: i64,
    pub commands: Vec<SerializedCommand>,
    /// Per player, every occupied position once all commands ran.
    pub end_field: Vec<Vec<ZoneSnapshot>>,
}

/// One duelist's deck lists and initial placements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayPlayer {
    pub name: String,
    /// Main deck passcodes in list order.
    pub deck: Vec<u32>,
    /// Indices into `deck`, bottom card first, as dealt.
    pub main_deck_order: Vec<usize>,
    pub extra_deck: Vec<u32>,
    /// Cards placed on this player's side at construction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_state: Vec<ReplayPlacement>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayPlacement {
    pub zone: ZoneAddress,
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl ReplayData {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Duel {
    /// Export a replay. Undone commands are redone first so the replay
    /// covers the whole history.
    pub fn replay_data(&mut self) -> Result<ReplayData> {
        self.go_to_end()?;

        let commands = self
            .history()
            .iter()
            .map(Command::to_serialized)
            .collect::<Result<Vec<_>>>()?;
        let end_field = PlayerId::both()
            .map(|player| self.snapshot(player))
            .collect::<Result<Vec<_>>>()?;

        Ok(ReplayData {
            players: self.roster().to_vec(),
            seed: self.seed(),
            starting_life_points: self.starting_life_points(),
            commands,
            end_field,
        })
    }

    /// Rebuild a duel from a replay and check it ends on the recorded field.
    pub fn from_replay(replay: &ReplayData, cards: &CardDatabase) -> Result<Self> {
        let mut options = DuelOptions::default()
            .without_shuffle()
            .with_seed(replay.seed)
            .with_life_points(replay.starting_life_points);
        let mut players = Vec::with_capacity(PLAYER_COUNT);

        for player in &replay.players {
            let lookup = |ids: &[u32]| ids.iter().map(|&id| cards.require(id).cloned()).collect::<Result<Vec<_>>>();
            players.push(
                PlayerConfig::new(player.name.clone())
                    .with_main_deck(lookup(&player.deck)?)
                    .with_extra_deck(lookup(&player.extra_deck)?)
                    .with_main_deck_order(player.main_deck_order.clone()),
            );
            for placement in &player.field_state {
                options = options.with_placement(placement.zone, cards.require(placement.id)?.clone(), placement.position);
            }
        }

        let mut duel = Duel::new(DuelConfig { players, options })?;

        // Decode everything before executing anything.
        let commands = replay
            .commands
            .iter()
            .map(Command::from_serialized)
            .collect::<Result<Vec<_>>>()?;
        for command in commands {
            duel.exec(command)?;
        }

        duel.verify_end_field(&replay.end_field)?;
        debug!(commands = replay.commands.len(), "replay reconstructed");
        Ok(duel)
    }

    /// Compare the current field with recorded snapshots.
    pub fn verify_end_field(&self, expected: &[Vec<ZoneSnapshot>]) -> Result<()> {
        if expected.len() != PLAYER_COUNT {
            return Err(DuelError::InvalidConfig(format!(
                "replay end field has {} sides, expected {PLAYER_COUNT}",
                expected.len()
            )));
        }

        for (player, expected) in PlayerId::both().zip(expected) {
            let actual = self.snapshot(player)?;
            if let Some((got, want)) = actual.iter().zip(expected).find(|(got, want)| got != want) {
                return Err(DuelError::ReplayMismatch {
                    player,
                    detail: format!("expected {want:?}, found {got:?}"),
                });
            }
            if actual.len() != expected.len() {
                return Err(DuelError::ReplayMismatch {
                    player,
                    detail: format!("expected {} occupied positions, found {}", expected.len(), actual.len()),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardData, CardType};
    use crate::commands::deck::{DrawData, ShuffleData};
    use crate::commands::summon::PlacementData;
    use crate::commands::CommandKind;

    fn card(id: u32) -> CardData {
        CardData::new(id, format!("Card {id}"), CardType::MONSTER | CardType::NORMAL).with_stats(1000, 1000)
    }

    fn database() -> CardDatabase {
        (1..=10).map(card).collect()
    }

    fn duel() -> Duel {
        let config = DuelConfig::new(
            PlayerConfig::new("A").with_main_deck((1..=6).map(card).collect()),
            PlayerConfig::new("B").with_main_deck((5..=10).map(card).collect()),
        )
        .with_options(DuelOptions::default().with_seed(3).with_placement(
            "GY2".parse().unwrap(),
            card(7),
            None,
        ));
        Duel::new(config).unwrap()
    }

    #[test]
    fn test_replay_reproduces_end_field() {
        let mut original = duel();
        original.exec(CommandKind::ShuffleDeck(ShuffleData::new(PlayerId::FIRST))).unwrap();
        original.exec(CommandKind::Draw(DrawData::new(PlayerId::FIRST, 2))).unwrap();
        let hand_card = original.field().card_at(&"H-1".parse().unwrap()).unwrap().unwrap();
        let id = original.field().card(hand_card).unwrap().id();
        original
            .exec(CommandKind::NormalSummon(PlacementData::new(
                PlayerId::FIRST,
                id,
                "H-1".parse().unwrap(),
                "M-3".parse().unwrap(),
            )))
            .unwrap();
        original.undo().unwrap();

        let replay = original.replay_data().unwrap();
        assert_eq!(replay.commands.len(), 3);
        assert!(replay.commands[0].data.get("swaps").is_some());

        let json = replay.to_json().unwrap();
        let rebuilt = Duel::from_replay(&ReplayData::from_json(&json).unwrap(), &database()).unwrap();
        assert_eq!(rebuilt.snapshot(PlayerId::FIRST).unwrap(), original.snapshot(PlayerId::FIRST).unwrap());
        assert_eq!(rebuilt.log().len(), original.log().len());
    }

    #[test]
    fn test_tampered_end_field_is_rejected() {
        let mut original = duel();
        original.exec(CommandKind::Draw(DrawData::new(PlayerId::SECOND, 1))).unwrap();
        let mut replay = original.replay_data().unwrap();
        replay.end_field[1].pop();

        let err = Duel::from_replay(&replay, &database()).unwrap_err();
        assert!(matches!(err, DuelError::ReplayMismatch { player, .. } if player == PlayerId::SECOND));
    }

    #[test]
    fn test_unknown_card_or_command() {
        let mut replay = duel().replay_data().unwrap();
        let empty = CardDatabase::new();
        assert!(matches!(Duel::from_replay(&replay, &empty), Err(DuelError::UnknownCard(_))));

        replay.commands.push(SerializedCommand { command_type: "Dance".into(), data: serde_json::Value::Null });
        assert!(matches!(
            Duel::from_replay(&replay, &database()),
            Err(DuelError::UnknownCommandType(_))
        ));
    }
}
