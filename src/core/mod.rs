//! Core engine types: identifiers, players, phases, RNG, configuration, errors.

pub mod config;
pub mod entity;
pub mod error;
pub mod phase;
pub mod player;
pub mod rng;

pub use config::{DuelConfig, DuelOptions, InitialPlacement, PlayerConfig, DEFAULT_LIFE_POINTS};
pub use entity::{CardHandle, CommandId};
pub use error::{DuelError, Result};
pub use phase::Phase;
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::{apply_swaps, validate_swaps, DuelRng, DuelRngState};
