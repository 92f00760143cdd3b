//! # duel-engine
//!
//! Reversible state engine for two-player trading-card duels, built for
//! replay viewers, puzzle editors and simulators.
//!
//! ## Design Principles
//!
//! 1. **Commands, not rules**: The engine applies what it is told. It checks
//!    that named cards are where the command says, never whether a play is
//!    legal.
//!
//! 2. **Every mutation is reversible**: Each command captures what it
//!    overwrote, so undo restores the field exactly and redo re-applies the
//!    same resolved parameters.
//!
//! 3. **All-or-nothing**: A command that fails halfway leaves the duel as it
//!    was before the call.
//!
//! ## Architecture
//!
//! - **Card arena**: Cards live in one arena indexed by `CardHandle`; zones
//!   and XYZ material lists store handles.
//!
//! - **Persistent Data Structures**: O(1) field cloning via `im-rs` backs
//!   the atomic commit/rollback of every command.
//!
//! - **Two-phase commands**: Intent data (passcodes and zone addresses) is
//!   resolved against the field right before first execution. Only the
//!   intent data is serialized, so replays are plain JSON.
//!
//! ## Modules
//!
//! - `core`: Ids, players, phases, RNG, configuration, errors
//! - `zones`: Zone addresses and the field state store
//! - `cards`: Card data, duel instances and the card database
//! - `log`: Log entries and subscribers
//! - `commands`: The command catalog and its reversible steps
//! - `engine`: The `Duel` command stack and replays

pub mod core;
pub mod zones;
pub mod cards;
pub mod log;
pub mod commands;
pub mod engine;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{
    CardHandle, CommandId, PlayerId, PlayerMap,
    DuelRng, DuelRngState,
    DuelConfig, DuelOptions, PlayerConfig, InitialPlacement,
    DuelError, Result, Phase,
};

pub use crate::zones::{FieldState, ZoneAddress, ZoneKind, ZoneSnapshot};

pub use crate::cards::{Card, CardData, CardDatabase, CardType, DeckPosition, Position};

pub use crate::log::{DuelLog, LogEntry, LogKind, LogNotice, SubscriptionId};

pub use crate::commands::{CardRef, Command, CommandKind, CommandType, SerializedCommand};

pub use crate::engine::{Duel, ReplayData};
