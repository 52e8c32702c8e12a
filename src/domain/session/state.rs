//! Mutable state of one game.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::game::{evaluate, Board, GameResult, GameSnapshot, Mark, Position};

use super::SessionError;

/// Why a move was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    GameOver,
    NotYourTurn,
    OutOfRange,
    Occupied,
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoveRejection::GameOver => "game over",
            MoveRejection::NotYourTurn => "not your turn",
            MoveRejection::OutOfRange => "position out of range",
            MoveRejection::Occupied => "cell occupied",
        };
        f.write_str(s)
    }
}

/// Result of [`SessionState::apply_move`].
///
/// The snapshot is always the post-call state; for a rejected move it equals
/// the state before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub snapshot: GameSnapshot,
    pub rejection: Option<MoveRejection>,
}

impl MoveOutcome {
    /// Returns true if the move changed the board.
    pub fn accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Board, turn, result and seated players of one game.
///
/// `H` is whatever handle the caller uses to reach a player's connection.
/// The number of attached players is derived from the seat map, so the
/// ready count can never drift from it.
#[derive(Debug)]
pub struct SessionState<H> {
    board: Board,
    turn: Mark,
    result: GameResult,
    players: BTreeMap<Mark, H>,
    retired: bool,
}

impl<H> Default for SessionState<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> SessionState<H> {
    /// A fresh game: empty board, `O` to move, nobody seated.
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
            turn: Mark::STARTING,
            result: GameResult::InProgress,
            players: BTreeMap::new(),
            retired: false,
        }
    }

    /// Seats a player on the first free mark (`O` then `X`).
    pub fn attach(&mut self, handle: H) -> Result<Mark, SessionError> {
        if self.retired {
            return Err(SessionError::Retired);
        }
        let mark = Mark::SEATING_ORDER
            .into_iter()
            .find(|mark| !self.players.contains_key(mark))
            .ok_or(SessionError::Full)?;
        self.players.insert(mark, handle);
        Ok(mark)
    }

    /// Frees a seat, returning the handle that held it.
    pub fn detach(&mut self, mark: Mark) -> Option<H> {
        self.players.remove(&mark)
    }

    /// Applies a move if it is legal; otherwise leaves everything unchanged.
    ///
    /// Legal means: the game is in progress, it is `mark`'s turn, the
    /// position is on the board, and the cell is empty. A winning or drawing
    /// move freezes the turn; any other accepted move passes it over.
    pub fn apply_move(&mut self, mark: Mark, raw_position: i64) -> MoveOutcome {
        let rejection = match self.check_move(mark, raw_position) {
            Ok(position) => {
                self.board.place(position, mark);
                self.result = GameResult::from(evaluate(&self.board));
                if !self.result.is_over() {
                    self.turn = mark.other();
                }
                None
            }
            Err(rejection) => Some(rejection),
        };
        MoveOutcome {
            snapshot: self.snapshot(),
            rejection,
        }
    }

    fn check_move(&self, mark: Mark, raw_position: i64) -> Result<Position, MoveRejection> {
        if self.result.is_over() {
            return Err(MoveRejection::GameOver);
        }
        if mark != self.turn {
            return Err(MoveRejection::NotYourTurn);
        }
        let position = Position::new(raw_position).map_err(|_| MoveRejection::OutOfRange)?;
        if !self.board.is_empty_at(position) {
            return Err(MoveRejection::Occupied);
        }
        Ok(position)
    }

    /// Starts a new game once the current one is over.
    ///
    /// Returns `None` and changes nothing while a game is in progress.
    pub fn apply_restart(&mut self) -> Option<GameSnapshot> {
        if !self.result.is_over() {
            return None;
        }
        self.board = Board::empty();
        self.turn = Mark::STARTING;
        self.result = GameResult::InProgress;
        Some(self.snapshot())
    }

    /// Copy of (board, turn, result).
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board,
            turn: self.turn,
            result: self.result,
        }
    }

    /// Number of seated players.
    pub fn ready_count(&self) -> usize {
        self.players.len()
    }

    /// Returns true if `mark` is seated.
    pub fn is_seated(&self, mark: Mark) -> bool {
        self.players.contains_key(&mark)
    }

    /// Marks the state as removed from the registry; later attaches fail.
    pub fn retire(&mut self) {
        self.retired = true;
    }

    /// Returns true once [`retire`](Self::retire) has been called.
    pub fn is_retired(&self) -> bool {
        self.retired
    }
}

impl<H: Clone> SessionState<H> {
    /// Handles of everyone currently seated, in seating order.
    pub fn recipients(&self) -> Vec<(Mark, H)> {
        self.players
            .iter()
            .map(|(mark, handle)| (*mark, handle.clone()))
            .collect()
    }
}
