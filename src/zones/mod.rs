//! Zone system for card locations.
//!
//! ## Key Types
//!
//! - `ZoneAddress`: Parsed zone address (`"M2-3"` and friends)
//! - `ZoneKind`: Zone kind segment of an address
//! - `PlayerField`: One duelist's zones and life points
//! - `FieldState`: Card arena plus both fields; the authoritative duel state
//! - `ZoneSnapshot`: One occupied position in an exported end field

pub mod address;
pub mod field;
pub mod store;

pub use address::{ZoneAddress, ZoneKind};
pub use field::PlayerField;
pub use store::{FieldState, ZoneSnapshot};
