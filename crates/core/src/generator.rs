//! Board generation - fills a board that starts with no matches
//!
//! First tries whole-board uniform random fills, rejecting any that contain a match.
//! After `max_attempts` rejections falls back to constrained cell-by-cell placement,
//! which avoids completing a run with the two placed neighbours to the left or above.
//! The fallback is best-effort: if no candidate qualifies within
//! `FALLBACK_TRIES_PER_CELL` draws, the last one is kept anyway.

use tracing::{debug, warn};

use crate::board::Board;
use crate::matcher::{find_matches, has_match};
use crate::rng::{GemIdSource, GemRng};
use crate::types::{GemKind, Position, DEFAULT_GENERATION_ATTEMPTS, FALLBACK_TRIES_PER_CELL};

/// How a generated board was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStrategy {
    /// A random fill was accepted on attempt `attempt` (1-based)
    Random { attempt: u32 },
    /// Constrained placement was used; `residual_matches` groups survived it
    Constrained { residual_matches: usize },
}

/// A freshly generated board plus how it came about
#[derive(Debug, Clone)]
pub struct GeneratedBoard {
    pub board: Board,
    pub strategy: GenerationStrategy,
}

impl GeneratedBoard {
    /// True when the best-effort fallback left a match on the board
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self.strategy,
            GenerationStrategy::Constrained { residual_matches } if residual_matches > 0
        )
    }
}

/// Generate a board with the default attempt budget
pub fn generate(size: usize, rng: &mut impl GemRng, ids: &mut impl GemIdSource) -> Board {
    generate_with_attempts(size, DEFAULT_GENERATION_ATTEMPTS, rng, ids).board
}

/// Generate a board, trying `max_attempts` random fills before the fallback
pub fn generate_with_attempts(
    size: usize,
    max_attempts: u32,
    rng: &mut impl GemRng,
    ids: &mut impl GemIdSource,
) -> GeneratedBoard {
    for attempt in 1..=max_attempts {
        let board = random_fill(size, rng, ids);
        if !has_match(&board) {
            debug!(size, attempt, "random fill accepted");
            return GeneratedBoard {
                board,
                strategy: GenerationStrategy::Random { attempt },
            };
        }
    }

    let board = generate_constrained(size, rng, ids);
    let residual_matches = find_matches(&board).len();
    if residual_matches > 0 {
        warn!(
            size,
            max_attempts, residual_matches, "board generation left matches after fallback"
        );
    } else {
        debug!(size, max_attempts, "constrained placement accepted");
    }
    GeneratedBoard {
        board,
        strategy: GenerationStrategy::Constrained { residual_matches },
    }
}

/// Fill every cell with a uniformly random kind
pub fn random_fill(size: usize, rng: &mut impl GemRng, ids: &mut impl GemIdSource) -> Board {
    let mut board = Board::new(size);
    for pos in board.positions().collect::<Vec<_>>() {
        board.place(pos, rng.next_kind(), ids.next_id());
    }
    board
}

/// Cell-by-cell placement that avoids completing runs to the left or above
pub fn generate_constrained(
    size: usize,
    rng: &mut impl GemRng,
    ids: &mut impl GemIdSource,
) -> Board {
    let mut board = Board::new(size);
    for pos in board.positions().collect::<Vec<_>>() {
        let mut kind = rng.next_kind();
        for _ in 1..FALLBACK_TRIES_PER_CELL {
            if !completes_run(&board, pos, kind) {
                break;
            }
            kind = rng.next_kind();
        }
        board.place(pos, kind, ids.next_id());
    }
    board
}

/// Would placing `kind` at `pos` make three in a row with the two cells to the left, or
/// the two cells above?
fn completes_run(board: &Board, pos: Position, kind: GemKind) -> bool {
    let same = |row: usize, col: usize| board.kind_at(Position::new(row, col)) == Some(kind);

    let left = pos.col >= 2 && same(pos.row, pos.col - 1) && same(pos.row, pos.col - 2);
    let above = pos.row >= 2 && same(pos.row - 1, pos.col) && same(pos.row - 2, pos.col);
    left || above
}
