//! Immutable view of a game for broadcasting.

use super::{Board, GameResult, Mark};

/// Copy of (board, turn, result) taken under a session's lock.
///
/// Safe to serialize and send after the lock is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSnapshot {
    pub board: Board,
    pub turn: Mark,
    pub result: GameResult,
}

impl GameSnapshot {
    /// The state of a game nobody has moved in yet.
    pub fn initial() -> Self {
        Self {
            board: Board::empty(),
            turn: Mark::STARTING,
            result: GameResult::InProgress,
        }
    }
}
