//! The duel driver: command history, undo/redo and replays.
//!
//! ## Key Types
//!
//! - `Duel`: Owns the field, log and command history
//! - `ReplayData`: Serializable record of a whole duel

pub mod duel;
pub mod replay;

pub use duel::Duel;
pub use replay::{ReplayData, ReplayPlacement, ReplayPlayer};
