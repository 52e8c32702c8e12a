//! WebSocket message types for the game protocol.
//!
//! Defines the JSON exchanged with browser clients:
//! - Server → Client: `init` on join, `update` after every accepted change
//! - Client → Server: `move` and `restart`
//!
//! Anything a client sends that does not decode into a [`ClientMessage`] is
//! ignored by the connection handler.

use serde::{Deserialize, Serialize};

use crate::application::PlayerCommand;
use crate::domain::game::{Board, GameSnapshot, Mark};
use crate::ports::SessionEvent;

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once to a player right after it takes a seat.
    Init(InitMessage),

    /// Sent to both players after an accepted move or restart.
    Update(UpdateMessage),
}

/// Seat assignment plus the full game state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitMessage {
    pub symbol: Mark,
    pub board: Board,
    pub current_player: Mark,
    pub players_ready: usize,
    pub game_over: bool,
    pub winner: &'static str,
}

/// Full game state after a change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessage {
    pub board: Board,
    pub current_player: Mark,
    pub game_over: bool,
    pub winner: &'static str,
}

impl From<GameSnapshot> for UpdateMessage {
    fn from(snapshot: GameSnapshot) -> Self {
        Self {
            board: snapshot.board,
            current_player: snapshot.turn,
            game_over: snapshot.result.is_over(),
            winner: snapshot.result.winner_label(),
        }
    }
}

impl From<&SessionEvent> for ServerMessage {
    fn from(event: &SessionEvent) -> Self {
        match *event {
            SessionEvent::Joined {
                mark,
                players_ready,
                snapshot,
            } => ServerMessage::Init(InitMessage {
                symbol: mark,
                board: snapshot.board,
                current_player: snapshot.turn,
                players_ready,
                game_over: snapshot.result.is_over(),
                winner: snapshot.result.winner_label(),
            }),
            SessionEvent::Updated(snapshot) => ServerMessage::Update(snapshot.into()),
        }
    }
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Place the sender's mark at a cell index.
    Move { position: i64 },

    /// Start a new game after the current one ended.
    Restart,
}

impl From<ClientMessage> for PlayerCommand {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::Move { position } => PlayerCommand::Move { position },
            ClientMessage::Restart => PlayerCommand::Restart,
        }
    }
}

/// Decodes a text frame, returning `None` for anything unrecognized.
pub fn parse_client_message(text: &str) -> Option<ClientMessage> {
    serde_json::from_str(text).ok()
}
