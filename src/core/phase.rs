//! Turn phases.

use serde::{Deserialize, Serialize};

/// Phase of the current turn.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    #[default]
    Draw,
    Standby,
    Main1,
    Battle,
    Main2,
    End,
}
