//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers and error types shared by the game and session
//! modules.

mod errors;
mod ids;

pub use errors::ValidationError;
pub use ids::{ConnectionId, SessionKey};
