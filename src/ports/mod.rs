//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application core and the outside world. Adapters implement these
//! ports.
//!
//! ## Connection Ports
//!
//! - `PlayerChannel` - Outbound delivery of game events to one seated player

mod player_channel;

pub use player_channel::{ChannelError, PlayerChannel, PlayerHandle, SessionEvent};
