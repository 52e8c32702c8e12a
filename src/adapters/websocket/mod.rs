//! WebSocket adapter for game connections.
//!
//! Each connection is one player. The handler upgrades the request, seats
//! the player through the [`GameCoordinator`](crate::application::GameCoordinator)
//! and then pumps client messages into it until the socket goes away.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     handler (per connection)                  │
//! │   upgrade → join → init → receive loop → release              │
//! └──────────────────────────────────────────────────────────────┘
//!          │ ClientMessage                  ▲ SessionEvent
//!          ▼                                │
//! ┌──────────────────────────────┐   ┌──────────────────────────┐
//! │       GameCoordinator        │──▶│  WebSocketChannel (sink) │
//! │  registry + session locks    │   │  write deadline, pings   │
//! └──────────────────────────────┘   └──────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`channel`] - Outbound half of a socket as a `PlayerChannel`
//! - [`keepalive`] - Periodic ping task per connection
//! - [`handler`] - Axum WebSocket upgrade handler and receive loop

pub mod channel;
pub mod handler;
pub mod keepalive;
pub mod messages;

pub use channel::WebSocketChannel;
pub use handler::{
    build_router, receive_loop, serve_connection, websocket_router, ws_handler, CloseReason,
    ConnectionEnd, WebSocketState,
};
pub use keepalive::{run_keepalive, spawn_keepalive, KeepaliveExit};
pub use messages::{
    parse_client_message, ClientMessage, InitMessage, ServerMessage, UpdateMessage,
};
