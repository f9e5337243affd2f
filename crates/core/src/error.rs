//! Error types for Sprig.

use alloc::string::String;
use core::fmt;

/// Result type alias for Sprig operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for reactive store operations.
///
/// Listener failures are not represented here: a listener that panics
/// unwinds through `invoke`/`update` untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Attaching a notifier node would make it its own ancestor.
    Cycle {
        name: String,
    },
    /// `update` was called while a binding was recording its reads, or while
    /// the state was already borrowed by a mutator or listener.
    ReentrantUpdate,
    /// `bind` was called from inside an `update` mutator.
    BindDuringUpdate,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Cycle { name } => {
                write!(f, "Attaching node as '{}' would create a containment cycle", name)
            }
            Error::ReentrantUpdate => {
                write!(f, "Reentrant update: the state is being read or mutated")
            }
            Error::BindDuringUpdate => {
                write!(f, "Cannot bind a listener while an update is running")
            }
        }
    }
}

impl Error {
    /// Creates a containment cycle error.
    pub fn cycle(name: impl Into<String>) -> Self {
        Error::Cycle { name: name.into() }
    }

    /// Creates a reentrant update error.
    pub fn reentrant_update() -> Self {
        Error::ReentrantUpdate
    }

    /// Creates a bind-during-update error.
    pub fn bind_during_update() -> Self {
        Error::BindDuringUpdate
    }
}
