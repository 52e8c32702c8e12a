//! Application layer - Session coordination.
//!
//! Orchestrates the pure domain state behind locks and pushes the results
//! out through the `PlayerChannel` port.
//!
//! - `session` - Lock-guarded game session
//! - `registry` - Process-wide session directory
//! - `seat` - A connection's claim on a mark, released exactly once
//! - `coordinator` - Join, command dispatch and broadcast

pub mod coordinator;
pub mod registry;
pub mod seat;
pub mod session;

pub use coordinator::{GameCoordinator, JoinError, PlayerCommand};
pub use registry::{JoinedSeat, SessionRegistry};
pub use seat::{Seat, SeatLease};
pub use session::{GameSession, LatestState};
