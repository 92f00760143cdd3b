//! Duel log entries.
//!
//! Every visible change a command makes is described by one `LogEntry`. A
//! composite command emits several entries, all carrying the id of the
//! command the caller submitted, so a renderer can group them and `undo`
//! can drop them together.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cards::Position;
use crate::commands::CommandType;
use crate::core::entity::CommandId;
use crate::core::error::DuelError;
use crate::core::phase::Phase;
use crate::core::player::PlayerId;
use crate::zones::ZoneAddress;

/// The `type` of a log entry: a command name, or `"Overlay"` for a card
/// becoming an XYZ material during a summon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LogKind {
    Command(CommandType),
    Overlay,
}

const OVERLAY: &str = "Overlay";

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogKind::Command(command_type) => f.write_str(command_type.as_str()),
            LogKind::Overlay => f.write_str(OVERLAY),
        }
    }
}

impl FromStr for LogKind {
    type Err = DuelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == OVERLAY {
            return Ok(LogKind::Overlay);
        }
        CommandType::from_str(s)
            .map(LogKind::Command)
            .map_err(|_| DuelError::UnknownCommandType(s.to_string()))
    }
}

impl From<CommandType> for LogKind {
    fn from(command_type: CommandType) -> Self {
        LogKind::Command(command_type)
    }
}

impl From<LogKind> for String {
    fn from(kind: LogKind) -> Self {
        kind.to_string()
    }
}

impl TryFrom<String> for LogKind {
    type Error = DuelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One entry of the duel log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub player: PlayerId,

    /// Id of the submitted (root) command.
    pub command_id: CommandId,

    #[serde(rename = "type")]
    pub kind: LogKind,

    /// Passcode of the card concerned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_zone: Option<ZoneAddress>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<ZoneAddress>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    /// Passcodes of XYZ materials, in attach order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atk: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
}

impl LogEntry {
    /// Create an entry with just a kind and player. The command id is filled
    /// in when the entry is recorded.
    pub fn new(kind: impl Into<LogKind>, player: PlayerId) -> Self {
        Self {
            player,
            command_id: CommandId(0),
            kind: kind.into(),
            id: None,
            origin_zone: None,
            zone: None,
            position: None,
            materials: Vec::new(),
            value: None,
            atk: None,
            def: None,
            phase: None,
        }
    }

    /// Set the card passcode (builder pattern).
    #[must_use]
    pub fn with_card(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_origin(mut self, zone: ZoneAddress) -> Self {
        self.origin_zone = Some(zone);
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: ZoneAddress) -> Self {
        self.zone = Some(zone);
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_materials(mut self, materials: Vec<u32>) -> Self {
        self.materials = materials;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    /// Set displayed ATK/DEF (builder pattern).
    #[must_use]
    pub fn with_stats(mut self, atk: Option<i32>, def: Option<i32>) -> Self {
        self.atk = atk;
        self.def = def;
        self
    }

    #[must_use]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Zone change entry: card `id` moved from `from` to `to`.
    pub fn zone_change(kind: impl Into<LogKind>, player: PlayerId, id: u32, from: ZoneAddress, to: ZoneAddress) -> Self {
        Self::new(kind, player).with_card(id).with_origin(from).with_zone(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> ZoneAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(LogKind::from(CommandType::NormalSummon).to_string(), "Normal Summon");
        assert_eq!(LogKind::Overlay.to_string(), "Overlay");
        assert_eq!("Send To GY".parse::<LogKind>().unwrap(), LogKind::Command(CommandType::SendToGy));
        assert!("Dance".parse::<LogKind>().is_err());
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = LogEntry::zone_change(
            CommandType::NormalSummon,
            PlayerId::FIRST,
            62318994,
            addr("H-1"),
            addr("M-1"),
        )
        .with_position(Position::FaceupAttack);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "player": 0,
                "commandId": 0,
                "type": "Normal Summon",
                "id": 62318994,
                "originZone": "H-1",
                "zone": "M-1",
                "position": "faceup-attack"
            })
        );

        let back: LogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_builders() {
        let entry = LogEntry::new(CommandType::ChangeLifePoints, PlayerId::SECOND)
            .with_value(-1000)
            .with_phase(Phase::Battle)
            .with_stats(Some(100), None)
            .with_materials(vec![1, 2]);

        assert_eq!(entry.value, Some(-1000));
        assert_eq!(entry.phase, Some(Phase::Battle));
        assert_eq!(entry.atk, Some(100));
        assert_eq!(entry.materials, vec![1, 2]);
    }
}
