//! Card system: static data, duel instances, and the card database.
//!
//! ## Key Types
//!
//! - `CardData`: Printed card data (passcode, name, type flags, stats)
//! - `CardType`: Card type flags
//! - `Card`: Duel-time card state (position, overrides, owners, materials)
//! - `Position`: Battle position / facing
//! - `CardDatabase`: Passcode lookup used to rebuild duels from replays

pub mod definition;
pub mod instance;
pub mod registry;

pub use definition::{CardData, CardType};
pub use instance::{Card, DeckPosition, Materials, Position};
pub use registry::CardDatabase;
