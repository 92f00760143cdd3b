//! The closed set of command kinds.
//!
//! Each kind pairs a `type` name (the string used in logs and replays) with
//! a serializable data struct. `command_catalog!` generates:
//!
//! - `CommandType`: the tag enum, parsed from / displayed as the type name
//! - `CommandKind`: the intent enum, one variant per type
//! - `REGISTRY`: the static type name → decoder table used for replays
//!
//! The data structs live in the variant modules together with the logic
//! that prepares them into `Step`s.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::card_state::{ChangePositionData, ChangeStatsData, CreateTokenData, DeclareAttackData, TokenRefData};
use super::deck::{DrawData, ShuffleData};
use super::duel_state::{ChangePhaseData, LifePointsData, NextTurnData};
use super::summon::{PlacementData, TributeData};
use super::transfer::{BanishData, MoveCardData, SourceData, ToDeckData};
use super::xyz::{AttachMaterialData, DetachMaterialData, XyzSummonData};
use super::Step;
use crate::core::error::{DuelError, Result};
use crate::core::player::PlayerId;
use crate::core::rng::DuelRng;
use crate::zones::FieldState;

/// Resolve intent data into a step against the current field.
pub(crate) trait Prepare {
    fn prepare(&mut self, command_type: CommandType, field: &FieldState, rng: &mut DuelRng) -> Result<Step>;
}

/// `{type, data}` record of a command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedCommand {
    #[serde(rename = "type")]
    pub command_type: String,
    #[serde(default)]
    pub data: Value,
}

type Decoder = fn(Value) -> Result<CommandKind>;

macro_rules! command_catalog {
    ($( $variant:ident($data:ty) => $name:literal ),+ $(,)?) => {
        /// Command type tag.
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            Hash,
            Serialize,
            Deserialize,
            strum::EnumString,
            strum::EnumIter,
        )]
        pub enum CommandType {
            $(
                #[serde(rename = $name)]
                #[strum(serialize = $name)]
                $variant,
            )+
        }

        impl CommandType {
            /// Type name used in logs and serialized commands.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(CommandType::$variant => $name,)+
                }
            }
        }

        /// Command intent: plain, serializable data.
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub enum CommandKind {
            $($variant($data),)+
        }

        impl CommandKind {
            #[must_use]
            pub fn command_type(&self) -> CommandType {
                match self {
                    $(CommandKind::$variant(_) => CommandType::$variant,)+
                }
            }

            /// Player issuing the command.
            #[must_use]
            pub fn player(&self) -> PlayerId {
                match self {
                    $(CommandKind::$variant(data) => data.player,)+
                }
            }

            fn data_value(&self) -> Result<Value> {
                match self {
                    $(CommandKind::$variant(data) => Ok(serde_json::to_value(data)?),)+
                }
            }

            fn prepare_data(&mut self, field: &FieldState, rng: &mut DuelRng) -> Result<Step> {
                let command_type = self.command_type();
                match self {
                    $(CommandKind::$variant(data) => data.prepare(command_type, field, rng),)+
                }
            }
        }

        static REGISTRY: &[(&str, Decoder)] = &[
            $(($name, |data| Ok(CommandKind::$variant(serde_json::from_value(data)?))),)+
        ];
    };
}

command_catalog! {
    MoveCard(MoveCardData) => "Move Card",
    NormalSummon(PlacementData) => "Normal Summon",
    SetMonster(PlacementData) => "Set Monster",
    SpecialSummon(MoveCardData) => "Special Summon",
    TributeSummon(TributeData) => "Tribute Summon",
    TributeSet(TributeData) => "Tribute Set",
    XyzSummon(XyzSummonData) => "XYZ Summon",
    AttachMaterial(AttachMaterialData) => "Attach Material",
    DetachMaterial(DetachMaterialData) => "Detach Material",
    SendToGy(SourceData) => "Send To GY",
    Banish(BanishData) => "Banish",
    ToHand(SourceData) => "To Hand",
    ToDeck(ToDeckData) => "To Deck",
    ToExtraDeck(SourceData) => "To Extra Deck",
    Activate(PlacementData) => "Activate",
    SetSpellTrap(PlacementData) => "Set Spell/Trap",
    Draw(DrawData) => "Draw",
    Mill(DrawData) => "Mill",
    ShuffleDeck(ShuffleData) => "Shuffle Deck",
    ShuffleHand(ShuffleData) => "Shuffle Hand",
    ChangePosition(ChangePositionData) => "Change Position",
    ChangeStats(ChangeStatsData) => "Change ATK/DEF",
    Reveal(SourceData) => "Reveal",
    DeclareAttack(DeclareAttackData) => "Declare Attack",
    CreateToken(CreateTokenData) => "Create Token",
    RemoveToken(TokenRefData) => "Remove Token",
    ChangeLifePoints(LifePointsData) => "Change Life Points",
    ChangePhase(ChangePhaseData) => "Change Phase",
    NextTurn(NextTurnData) => "Next Turn",
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CommandKind {
    /// Decode intent data for a type name.
    pub fn decode(type_name: &str, data: Value) -> Result<Self> {
        let (_, decoder) = REGISTRY
            .iter()
            .find(|(name, _)| *name == type_name)
            .ok_or_else(|| DuelError::UnknownCommandType(type_name.to_string()))?;
        decoder(data)
    }

    /// `{type, data}` record of this intent.
    pub fn encode(&self) -> Result<SerializedCommand> {
        Ok(SerializedCommand {
            command_type: self.command_type().as_str().to_string(),
            data: self.data_value()?,
        })
    }

    /// Resolve against `field`. Data that is generated on first preparation
    /// (shuffle swaps) is written back into `self`.
    pub(crate) fn prepare(&mut self, field: &FieldState, rng: &mut DuelRng) -> Result<Step> {
        field.ensure_player(self.player())?;
        self.prepare_data(field, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::deck::DrawData;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_type_is_registered() {
        assert_eq!(REGISTRY.len(), CommandType::iter().count());
        for command_type in CommandType::iter() {
            assert!(REGISTRY.iter().any(|(name, _)| *name == command_type.as_str()));
            assert_eq!(CommandType::from_str(command_type.as_str()).unwrap(), command_type);
            let json = serde_json::to_string(&command_type).unwrap();
            assert_eq!(json, format!("\"{}\"", command_type.as_str()));
        }
    }

    #[test]
    fn test_decode_unknown_type() {
        let err = CommandKind::decode("Pot Of Greed", Value::Null).unwrap_err();
        assert!(matches!(err, DuelError::UnknownCommandType(name) if name == "Pot Of Greed"));
    }

    #[test]
    fn test_decode_malformed_data() {
        let err = CommandKind::decode("Draw", serde_json::json!({"player": 0})).unwrap_err();
        assert!(matches!(err, DuelError::MalformedCommand(_)));
    }

    #[test]
    fn test_encode_decode() {
        let kind = CommandKind::Mill(DrawData::new(PlayerId::SECOND, 3));
        let record = kind.encode().unwrap();
        assert_eq!(record.command_type, "Mill");
        assert_eq!(record.data, serde_json::json!({"player": 1, "count": 3}));
        assert_eq!(CommandKind::decode(&record.command_type, record.data).unwrap(), kind);
    }

    #[test]
    fn test_serialized_command_shape() {
        let record: SerializedCommand = serde_json::from_str(r#"{"type":"Next Turn","data":{"player":1}}"#).unwrap();
        let kind = CommandKind::decode(&record.command_type, record.data).unwrap();
        assert_eq!(kind.command_type(), CommandType::NextTurn);
        assert_eq!(kind.player(), PlayerId::SECOND);
    }
}
