//! Error types for the Galaxy3D visibility engine
//!
//! Handle misuse is a programmer error: the plain registry accessors turn
//! these errors into a panic with the formatted message, while the `try_*`
//! accessors hand them back to the caller.

use std::fmt;

/// Result type for Galaxy3D visibility operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D visibility errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Handle index beyond the registry arrays
    InvalidHandle {
        /// Offending slot index
        index: usize,
        /// Number of slots in the registry at the time of access
        slot_count: usize,
    },

    /// Handle refers to a slot that was released (or cleared) since it was issued
    StaleHandle {
        /// Slot index of the handle
        index: usize,
        /// Generation carried by the handle
        generation: u32,
        /// Generation currently stored for the slot
        current_generation: u32,
    },

    /// A shared registry lock was poisoned by a panicking thread
    LockPoisoned(String),

    /// Initialization failed (worker pool, engine)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidHandle { index, slot_count } => write!(
                f,
                "Invalid handle: index {} >= slot count {}",
                index, slot_count
            ),
            Error::StaleHandle { index, generation, current_generation } => write!(
                f,
                "Stale handle: index {} has generation {} but slot is at generation {}",
                index, generation, current_generation
            ),
            Error::LockPoisoned(msg) => write!(f, "Lock poisoned: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
