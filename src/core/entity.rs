//! Identifiers for cards held by the duel and for executed commands.
//!
//! ## CardHandle
//!
//! Cards live in an arena owned by the field store. A `CardHandle` is the
//! arena index of one physical card. Two copies of the same card share a
//! passcode (`CardData::id`) but never a handle, so zones and material lists
//! store handles and the "one card, one place" rule is checked by handle
//! uniqueness.
//!
//! ## CommandId
//!
//! Sequence number assigned by the command stack when a command is first
//! executed. Every log entry emitted by a command, including entries emitted
//! by its children, carries the root command's id.
//!
//! ```
//! use duel_engine::core::{CardHandle, CommandId};
//!
//! let handle = CardHandle(3);
//! assert_eq!(handle.index(), 3);
//! assert_eq!(format!("{}", CommandId(7)), "Command(7)");
//! ```

use serde::{Deserialize, Serialize};

/// Arena index of a card instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardHandle(pub u32);

impl CardHandle {
    /// Get the arena slot for this handle.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Build a handle from an arena slot.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

impl std::fmt::Display for CardHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card#{}", self.0)
    }
}

/// Sequence id of a command in the duel history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandId(pub u32);

impl CommandId {
    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The id following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u32> for CommandId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Command({})", self.0)
    }
}
