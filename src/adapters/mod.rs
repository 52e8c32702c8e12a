//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the game to the outside world:
//! - `websocket` - Player connections over axum WebSockets
//! - `memory` - In-memory player channel for tests

pub mod memory;
pub mod websocket;

pub use memory::RecordingChannel;
