//! The 3×3 board and win/draw evaluation.

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::domain::foundation::ValidationError;

use super::Mark;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// Winning triples in evaluation order: rows, columns, diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A validated cell index in `[0, 9)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(usize);

impl Position {
    /// Validates a raw index as received from a client.
    pub fn new(raw: i64) -> Result<Self, ValidationError> {
        if (0..BOARD_CELLS as i64).contains(&raw) {
            Ok(Self(raw as usize))
        } else {
            Err(ValidationError::out_of_range(
                "position",
                0,
                BOARD_CELLS as i64 - 1,
                raw,
            ))
        }
    }

    /// Returns the index into the board.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Outcome of scanning a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// No line is complete and at least one cell is empty.
    Ongoing,
    /// The given mark holds a complete line.
    Winner(Mark),
    /// Every cell is filled and no line is complete.
    Draw,
}

/// Nine cells in row-major order.
///
/// Serializes as an array of nine strings with `""` for an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board([Option<Mark>; BOARD_CELLS]);

impl Board {
    /// An all-empty board.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a board from explicit cells.
    pub fn from_cells(cells: [Option<Mark>; BOARD_CELLS]) -> Self {
        Self(cells)
    }

    /// Returns the mark in a cell, if any.
    pub fn get(&self, position: Position) -> Option<Mark> {
        self.0[position.index()]
    }

    /// Returns true if the cell holds no mark.
    pub fn is_empty_at(&self, position: Position) -> bool {
        self.get(position).is_none()
    }

    /// Writes a mark into a cell, overwriting whatever is there.
    ///
    /// Callers check occupancy first; the board itself has no turn rules.
    pub fn place(&mut self, position: Position, mark: Mark) {
        self.0[position.index()] = Some(mark);
    }

    /// Returns true when no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// Borrow all cells.
    pub fn cells(&self) -> &[Option<Mark>; BOARD_CELLS] {
        &self.0
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(BOARD_CELLS))?;
        for cell in &self.0 {
            seq.serialize_element(cell.map(Mark::as_str).unwrap_or(""))?;
        }
        seq.end()
    }
}

/// Evaluates a board.
///
/// Returns the mark of the first line in [`WIN_LINES`] holding three equal
/// marks; otherwise `Draw` if the board is full; otherwise `Ongoing`.
pub fn evaluate(board: &Board) -> Evaluation {
    let cells = board.cells();
    for [a, b, c] in WIN_LINES {
        if let Some(mark) = cells[a] {
            if cells[b] == Some(mark) && cells[c] == Some(mark) {
                return Evaluation::Winner(mark);
            }
        }
    }

    if board.is_full() {
        Evaluation::Draw
    } else {
        Evaluation::Ongoing
    }
}
