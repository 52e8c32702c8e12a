//! PlayerChannel port - Outbound handle to one seated player.
//!
//! A session keeps one handle per mark. The coordinator pushes game events
//! through it without knowing whether the other end is a WebSocket, a test
//! recorder, or anything else.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::ConnectionId;
use crate::domain::game::{GameSnapshot, Mark};

/// Something the coordinator tells a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Sent once, to the joining player only.
    Joined {
        mark: Mark,
        players_ready: usize,
        snapshot: GameSnapshot,
    },
    /// Sent to every seated player after an accepted move or restart.
    Updated(GameSnapshot),
}

/// Errors from a single send on a player channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The peer has gone away.
    #[error("channel closed")]
    Closed,

    /// The write did not complete within the write deadline.
    #[error("write timed out after {0:?}")]
    Timeout(Duration),

    /// The transport reported an error.
    #[error("transport error: {0}")]
    Transport(String),

    /// The event could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Port for delivering events to one connected player.
///
/// Implementations must bound every write by a deadline so that a dead or
/// backed-up peer cannot stall a broadcast to the other player.
#[async_trait]
pub trait PlayerChannel: Send + Sync {
    /// Identifier of the underlying connection, for logging.
    fn connection_id(&self) -> ConnectionId;

    /// Deliver one event.
    async fn send(&self, event: &SessionEvent) -> Result<(), ChannelError>;

    /// Send a liveness probe that carries no game data.
    async fn probe(&self) -> Result<(), ChannelError>;
}

/// Shared handle stored in a session's seat map.
pub type PlayerHandle = Arc<dyn PlayerChannel>;
