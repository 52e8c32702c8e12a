//! Session domain module.
//!
//! One game's mutable state and the rules for changing it: who sits where,
//! whose turn it is, which moves land. The state is plain data; locking and
//! sharing live in the application layer.

mod errors;
mod state;

pub use errors::SessionError;
pub use state::{MoveOutcome, MoveRejection, SessionState};
