//! Move validation - bounds, occupancy and adjacency checks for a swap

use crate::board::Board;
use crate::types::Position;

/// Why a swap was refused before any matching was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidMove {
    /// A coordinate lies outside `[0, size)`
    OutOfBounds,
    /// One of the two cells holds no gem
    EmptyCell,
    /// The cells are not orthogonal neighbours
    NotAdjacent,
}

impl InvalidMove {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidMove::OutOfBounds => "out_of_bounds",
            InvalidMove::EmptyCell => "empty_cell",
            InvalidMove::NotAdjacent => "not_adjacent",
        }
    }
}

/// Check a swap, reporting the first rule it breaks
pub fn check_move(board: &Board, from: Position, to: Position) -> Result<(), InvalidMove> {
    let size = board.size();
    if !from.in_bounds(size) || !to.in_bounds(size) {
        return Err(InvalidMove::OutOfBounds);
    }
    if !board.is_occupied(from) || !board.is_occupied(to) {
        return Err(InvalidMove::EmptyCell);
    }
    if !from.is_adjacent(to) {
        return Err(InvalidMove::NotAdjacent);
    }
    Ok(())
}

/// True when `from` and `to` are in bounds, occupied, and exactly one step apart
pub fn is_valid_move(board: &Board, from: Position, to: Position) -> bool {
    check_move(board, from, to).is_ok()
}
