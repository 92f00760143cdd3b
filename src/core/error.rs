//! Error type shared by the whole engine.
//!
//! Every failure is a local, synchronous `Err`. The command stack treats an
//! error during `exec`/`undo`/`redo` as fatal for that call only: the field
//! and log are restored to their state before the call (see
//! `engine::Duel`), so a caller may keep using the duel afterwards.

use crate::core::entity::CommandId;
use crate::core::player::PlayerId;
use crate::zones::ZoneAddress;

/// Errors surfaced by the duel engine.
#[derive(Debug, thiserror::Error)]
pub enum DuelError {
    /// Address string (or tuple) that does not name a zone.
    #[error("invalid zone address `{0}`")]
    InvalidZoneAddress(String),

    /// The zone is empty or holds a different card than expected.
    #[error("card {} not found in {zone}", describe_id(.id))]
    CardNotFoundInZone { id: Option<u32>, zone: ZoneAddress },

    /// Serialized command whose `type` is not in the catalog.
    #[error("unknown command type `{0}`")]
    UnknownCommandType(String),

    /// Pile insertion with no card.
    #[error("no card to insert into {0}")]
    NoCardToInsert(ZoneAddress),

    /// Slot zone already holds a card.
    #[error("{0} is already occupied")]
    ZoneOccupied(ZoneAddress),

    #[error("card {id} has {count} materials, no material at index {index}")]
    MaterialIndexOutOfRange { id: u32, index: usize, count: usize },

    #[error("{player} needs {requested} cards in {zone} but only {available} remain")]
    NotEnoughCards {
        player: PlayerId,
        zone: ZoneAddress,
        requested: usize,
        available: usize,
    },

    #[error("card {0} is not a token")]
    NotAToken(u32),

    #[error("invalid swap sequence: {0}")]
    InvalidSwapSequence(String),

    #[error("{0} is not a duelist")]
    UnknownPlayer(PlayerId),

    #[error("{0} is not in the command history")]
    CommandNotInHistory(CommandId),

    #[error("invalid duel configuration: {0}")]
    InvalidConfig(String),

    #[error("card {0} is not in the card database")]
    UnknownCard(u32),

    /// Re-executed replay produced a different end field.
    #[error("replay diverged for {player}: {detail}")]
    ReplayMismatch { player: PlayerId, detail: String },

    /// Field store bookkeeping is inconsistent (lost or duplicated card).
    #[error("field state invariant violated: {0}")]
    Integrity(String),

    #[error("malformed command payload: {0}")]
    MalformedCommand(#[from] serde_json::Error),

    #[error("checkpoint encoding failed: {0}")]
    Checkpoint(#[from] bincode::Error),
}

impl DuelError {
    /// Whether the error means the engine's own bookkeeping is broken rather
    /// than the caller having asked for something impossible.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Integrity(_) | Self::ReplayMismatch { .. })
    }
}

fn describe_id(id: &Option<u32>) -> String {
    id.map_or_else(|| "<any>".to_string(), |id| id.to_string())
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DuelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::ZoneKind;

    #[test]
    fn test_display_card_not_found() {
        let zone = ZoneAddress::new(ZoneKind::Monster, PlayerId::new(1), Some(2)).unwrap();
        let err = DuelError::CardNotFoundInZone { id: Some(62318994), zone };
        assert_eq!(err.to_string(), "card 62318994 not found in M2-2");

        let err = DuelError::CardNotFoundInZone { id: None, zone };
        assert_eq!(err.to_string(), "card <any> not found in M2-2");
    }

    #[test]
    fn test_internal_classification() {
        assert!(DuelError::Integrity("lost".into()).is_internal());
        assert!(!DuelError::UnknownCommandType("Dance".into()).is_internal());
    }

    #[test]
    fn test_from_serde_error() {
        let err: DuelError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, DuelError::MalformedCommand(_)));
    }
}
