//! Player marks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two player identifiers.
///
/// A mark is written into board cells and also keys a session's player
/// slots. `O` always moves first and is handed to the first connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mark {
    O,
    X,
}

impl Mark {
    /// The mark that moves first in every game.
    pub const STARTING: Mark = Mark::O;

    /// Slot assignment order for joining connections.
    pub const SEATING_ORDER: [Mark; 2] = [Mark::O, Mark::X];

    /// Returns the opposing mark.
    pub fn other(self) -> Mark {
        match self {
            Mark::O => Mark::X,
            Mark::X => Mark::O,
        }
    }

    /// Wire representation (`"O"` or `"X"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Mark::O => "O",
            Mark::X => "X",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
