//! Game result.

use super::{Evaluation, Mark};

/// Where a game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameResult {
    #[default]
    InProgress,
    Won(Mark),
    Draw,
}

impl GameResult {
    /// Returns true once the game has been won or drawn.
    pub fn is_over(&self) -> bool {
        !matches!(self, GameResult::InProgress)
    }

    /// Wire label for the `winner` field: `""`, `"O"`, `"X"` or `"draw"`.
    pub fn winner_label(&self) -> &'static str {
        match self {
            GameResult::InProgress => "",
            GameResult::Won(mark) => mark.as_str(),
            GameResult::Draw => "draw",
        }
    }
}

impl From<Evaluation> for GameResult {
    fn from(evaluation: Evaluation) -> Self {
        match evaluation {
            Evaluation::Ongoing => GameResult::InProgress,
            Evaluation::Winner(mark) => GameResult::Won(mark),
            Evaluation::Draw => GameResult::Draw,
        }
    }
}
