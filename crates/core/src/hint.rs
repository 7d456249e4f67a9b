//! Hint search - every swap that would produce a match
//!
//! Brute force: each cell is tried against its right and down neighbour, so every
//! unordered pair is tested exactly once. Swaps are applied to a scratch copy and
//! reverted after testing; the caller's board is never touched.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::matcher::has_match;
use crate::rng::GemRng;
use crate::types::Position;
use crate::validator::is_valid_move;

/// A pair of cells to exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swap {
    pub from: Position,
    pub to: Position,
}

impl Swap {
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// Same pair regardless of direction
    pub fn same_pair(&self, other: &Swap) -> bool {
        (self.from == other.from && self.to == other.to)
            || (self.from == other.to && self.to == other.from)
    }
}

/// Right and down neighbours of `pos` that lie on the board
fn forward_neighbours(pos: Position, size: usize) -> ArrayVec<Position, 2> {
    let mut out = ArrayVec::new();
    if let Some(right) = pos.right(size) {
        out.push(right);
    }
    if let Some(down) = pos.down(size) {
        out.push(down);
    }
    out
}

/// Every legal swap that leaves at least one match, in row-major order of `from`
pub fn legal_swaps(board: &Board) -> Vec<Swap> {
    let size = board.size();
    let mut scratch = board.clone();
    let mut swaps = Vec::new();

    for from in board.positions() {
        for to in forward_neighbours(from, size) {
            if !is_valid_move(&scratch, from, to) {
                continue;
            }
            scratch.swap(from, to);
            let matched = has_match(&scratch);
            scratch.swap(from, to);
            if matched {
                swaps.push(Swap::new(from, to));
            }
        }
    }

    swaps
}

/// True if the board has any matching swap
pub fn has_legal_move(board: &Board) -> bool {
    !legal_swaps(board).is_empty()
}

/// Pick one matching swap uniformly at random
pub fn suggest(board: &Board, rng: &mut impl GemRng) -> Option<Swap> {
    let swaps = legal_swaps(board);
    if swaps.is_empty() {
        return None;
    }
    let idx = rng.next_below(swaps.len() as u32) as usize;
    swaps.get(idx).copied()
}
