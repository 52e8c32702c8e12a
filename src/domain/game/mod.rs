//! Game module - Pure tic-tac-toe rules.
//!
//! Nothing in here knows about connections, locks or sessions. The board is
//! a plain value; [`evaluate`] decides whether a position is won, drawn or
//! still open.

mod board;
mod mark;
mod result;
mod snapshot;

pub use board::{evaluate, Board, Evaluation, Position, BOARD_CELLS, WIN_LINES};
pub use mark::Mark;
pub use result::GameResult;
pub use snapshot::GameSnapshot;
