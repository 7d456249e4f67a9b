//! Engine error taxonomy
//!
//! Invalid swaps are not errors: they come back as a `MoveOutcome` with
//! `valid == false` and a [`MoveRejection`]. Everything here is a refused operation
//! that left the committed state untouched.

use gem_cascade_core::InvalidMove;
use gem_cascade_types::GameStatus;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Another move is still being resolved
    #[error("a move is already in progress")]
    MoveInProgress,

    /// The operation is not allowed in the current status
    #[error("cannot {operation} while {status}")]
    InvalidState {
        operation: &'static str,
        status: GameStatus,
    },

    /// The board has no swap that produces a match
    #[error("no moves available")]
    NoMovesAvailable,

    /// Cascade resolution hit the round cap; the move was not committed
    #[error("cascade did not settle within {rounds} rounds")]
    TooManyCascades { rounds: u32 },

    #[error("board size {size} is outside {min}..={max}")]
    InvalidBoardSize { size: usize, min: usize, max: usize },

    /// A supplied board has empty cells or stale coordinates
    #[error("board is not a full, consistent grid")]
    InvalidBoard,
}

impl EngineError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::MoveInProgress => "move_in_progress",
            EngineError::InvalidState { .. } => "invalid_state",
            EngineError::NoMovesAvailable => "no_moves_available",
            EngineError::TooManyCascades { .. } => "too_many_cascades",
            EngineError::InvalidBoardSize { .. } => "invalid_board_size",
            EngineError::InvalidBoard => "invalid_board",
        }
    }
}

impl From<gem_cascade_core::TooManyCascades> for EngineError {
    fn from(err: gem_cascade_core::TooManyCascades) -> Self {
        EngineError::TooManyCascades { rounds: err.rounds }
    }
}

/// Why a swap came back with `valid == false`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveRejection {
    OutOfBounds,
    EmptyCell,
    NotAdjacent,
    /// Geometrically legal, but the swap lines nothing up
    NoMatch,
}

impl MoveRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveRejection::OutOfBounds => "out_of_bounds",
            MoveRejection::EmptyCell => "empty_cell",
            MoveRejection::NotAdjacent => "not_adjacent",
            MoveRejection::NoMatch => "no_match",
        }
    }
}

impl From<InvalidMove> for MoveRejection {
    fn from(value: InvalidMove) -> Self {
        match value {
            InvalidMove::OutOfBounds => MoveRejection::OutOfBounds,
            InvalidMove::EmptyCell => MoveRejection::EmptyCell,
            InvalidMove::NotAdjacent => MoveRejection::NotAdjacent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_and_codes() {
        let err = EngineError::InvalidState {
            operation: "show a hint",
            status: GameStatus::Paused,
        };
        assert_eq!(err.to_string(), "cannot show a hint while paused");
        assert_eq!(err.code(), "invalid_state");
        assert_eq!(
            EngineError::from(gem_cascade_core::TooManyCascades { rounds: 50 }),
            EngineError::TooManyCascades { rounds: 50 }
        );
    }

    #[test]
    fn rejection_from_invalid_move() {
        assert_eq!(
            MoveRejection::from(InvalidMove::NotAdjacent),
            MoveRejection::NotAdjacent
        );
        assert_eq!(MoveRejection::NoMatch.as_str(), "no_match");
    }
}
