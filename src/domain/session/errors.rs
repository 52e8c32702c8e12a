//! Session-specific error types.

use thiserror::Error;

/// Reasons a connection cannot take a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Both marks are already taken.
    #[error("game is full")]
    Full,

    /// The session was removed from the registry after its last player left.
    #[error("session has been retired")]
    Retired,
}
