//! WebSocket upgrade handler for game connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Upgrade to WebSocket
//! 2. Take a seat in the named game (or get refused if it is full)
//! 3. Send the `init` message and start the keep-alive task
//! 4. Apply `move` / `restart` messages until the peer goes away
//! 5. Free the seat, dropping the game if nobody is left

use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{close_code, Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::{Sink, Stream, StreamExt};
use tower_http::trace::TraceLayer;

use crate::application::{GameCoordinator, JoinError, Seat};
use crate::config::GameConfig;
use crate::domain::foundation::{ConnectionId, SessionKey};
use crate::ports::PlayerHandle;

use super::channel::WebSocketChannel;
use super::keepalive::spawn_keepalive;
use super::messages::parse_client_message;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    /// Shared session coordinator.
    pub coordinator: GameCoordinator,
    /// Deadlines and keep-alive period.
    pub game: GameConfig,
}

impl WebSocketState {
    /// Create a new WebSocket state.
    pub fn new(coordinator: GameCoordinator, game: GameConfig) -> Self {
        Self { coordinator, game }
    }
}

/// Why a receive loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer sent a close frame.
    PeerClosed,
    /// The stream ended without a close frame.
    StreamEnded,
    /// Nothing arrived within the read deadline.
    ReadTimeout(Duration),
    /// The transport reported an error.
    Transport(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::PeerClosed => write!(f, "peer closed"),
            CloseReason::StreamEnded => write!(f, "stream ended"),
            CloseReason::ReadTimeout(after) => write!(f, "read timed out after {:?}", after),
            CloseReason::Transport(e) => write!(f, "transport error: {}", e),
        }
    }
}

/// Handle WebSocket upgrade requests for a game.
///
/// Route: `GET /ws/:game_id`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(game_id): Path<String>,
    State(state): State<WebSocketState>,
) -> Response {
    let key = match SessionKey::new(game_id) {
        Ok(key) => key,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    ws.on_failed_upgrade(|e| tracing::warn!(error = %e, "WebSocket upgrade failed"))
        .on_upgrade(move |socket| handle_socket(socket, key, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, key: SessionKey, state: WebSocketState) {
    let (sink, stream) = socket.split();
    serve_connection(sink, stream, key, state).await;
}

/// How a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEnd {
    /// No seat was kept; the peer never reached the receive loop.
    Refused(JoinError),
    /// The player was seated and the receive loop ran until `CloseReason`.
    Closed(CloseReason),
}

/// Runs one player connection over a split socket.
///
/// This function runs for the lifetime of the connection. Once a seat is
/// taken, it is released exactly once whichever way the loop ends, and the
/// keep-alive task stops before the seat is freed.
pub async fn serve_connection<Si, St>(
    sink: Si,
    mut stream: St,
    key: SessionKey,
    state: WebSocketState,
) -> ConnectionEnd
where
    Si: Sink<Message> + Unpin + Send + 'static,
    Si::Error: Display + Send,
    St: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let connection_id = ConnectionId::new();
    let channel = Arc::new(WebSocketChannel::new(
        connection_id,
        sink,
        state.game.write_timeout(),
    ));
    let handle: PlayerHandle = channel.clone();

    let lease = match state.coordinator.join(key.clone(), handle.clone()).await {
        Ok(lease) => lease,
        Err(JoinError::Seat(e)) => {
            tracing::info!(
                game_id = %key,
                connection_id = %connection_id,
                reason = %e,
                "Connection refused"
            );
            if let Err(err) = channel.close(close_code::POLICY, e.to_string()).await {
                tracing::debug!(connection_id = %connection_id, error = %err, "Failed to send close frame");
            }
            return ConnectionEnd::Refused(JoinError::Seat(e));
        }
        Err(e) => {
            tracing::debug!(game_id = %key, connection_id = %connection_id, error = %e, "Failed to send init message");
            return ConnectionEnd::Refused(e);
        }
    };

    tracing::info!(
        game_id = %key,
        connection_id = %connection_id,
        mark = %lease.mark(),
        "WebSocket connection established"
    );

    let keepalive = spawn_keepalive(handle, state.game.keepalive_interval());
    let reason = receive_loop(
        &mut stream,
        &state.coordinator,
        lease.seat(),
        state.game.read_timeout(),
    )
    .await;
    drop(keepalive);

    tracing::info!(
        game_id = %key,
        connection_id = %connection_id,
        mark = %lease.mark(),
        %reason,
        "WebSocket connection closed"
    );
    lease.release().await;
    ConnectionEnd::Closed(reason)
}

/// Reads client messages and applies them until the connection ends.
///
/// Each wait for the next frame is bounded by `read_timeout`; any inbound
/// frame, pongs included, starts a fresh wait.
pub async fn receive_loop<S>(
    stream: &mut S,
    coordinator: &GameCoordinator,
    seat: &Seat,
    read_timeout: Duration,
) -> CloseReason
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let message = match tokio::time::timeout(read_timeout, stream.next()).await {
            Err(_) => return CloseReason::ReadTimeout(read_timeout),
            Ok(None) => return CloseReason::StreamEnded,
            Ok(Some(Err(e))) => return CloseReason::Transport(e.to_string()),
            Ok(Some(Ok(message))) => message,
        };

        match message {
            Message::Text(text) => match parse_client_message(&text) {
                Some(client_msg) => {
                    coordinator.handle(seat, client_msg.into()).await;
                }
                None => {
                    tracing::debug!(game_id = %seat.key, mark = %seat.mark, "Ignoring unrecognized message");
                }
            },
            Message::Binary(_) => {
                tracing::debug!(game_id = %seat.key, mark = %seat.mark, "Ignoring binary message");
            }
            Message::Ping(_) | Message::Pong(_) => {
                // Pings are answered by axum; both count as activity.
            }
            Message::Close(_) => return CloseReason::PeerClosed,
        }
    }
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> Router<WebSocketState> {
    Router::new().route("/ws/:game_id", get(ws_handler))
}

/// Full application router with HTTP request tracing.
pub fn build_router(state: WebSocketState) -> Router {
    websocket_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
