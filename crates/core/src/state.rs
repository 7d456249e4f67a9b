//! Game state snapshot - the authoritative per-game record
//!
//! The engine owns one `GameState` and hands out clones; collaborators never see a
//! partially applied move.

use crate::board::Board;
use crate::scoring::target_score;
use crate::types::{GameStatus, STARTING_LEVEL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub score: u32,
    pub level: u32,
    pub moves: u32,
    /// `level * 1000 + (level - 1) * 500`
    pub target_score: u32,
    pub status: GameStatus,
    /// Cascade rounds triggered by the last committed move
    pub combo_multiplier: u32,
    pub last_move_score: u32,
}

impl GameState {
    /// Fresh playing state at `level` on `board`
    pub fn new(board: Board, level: u32) -> Self {
        Self {
            board,
            score: 0,
            level,
            moves: 0,
            target_score: target_score(level),
            status: GameStatus::Playing,
            combo_multiplier: 0,
            last_move_score: 0,
        }
    }

    /// Zero the counters that belong to a single level attempt
    pub fn clear_level_counters(&mut self) {
        self.moves = 0;
        self.combo_multiplier = 0;
        self.last_move_score = 0;
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    pub fn target_reached(&self) -> bool {
        self.score >= self.target_score
    }
}

impl Default for GameState {
    /// Idle state with an empty zero-size board
    fn default() -> Self {
        Self {
            status: GameStatus::Idle,
            ..Self::new(Board::new(0), STARTING_LEVEL)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle_level_one() {
        let s = GameState::default();
        assert_eq!(s.status, GameStatus::Idle);
        assert_eq!(s.level, 1);
        assert_eq!(s.target_score, 1000);
        assert_eq!(s.board.size(), 0);
    }

    #[test]
    fn new_state_targets_level() {
        let s = GameState::new(Board::new(4), 3);
        assert!(s.is_playing());
        assert_eq!(s.target_score, 4000);
        assert!(!s.target_reached());
    }

    #[test]
    fn clear_level_counters_keeps_score() {
        let mut s = GameState::new(Board::new(4), 2);
        s.score = 700;
        s.moves = 9;
        s.combo_multiplier = 3;
        s.last_move_score = 200;
        s.clear_level_counters();
        assert_eq!((s.moves, s.combo_multiplier, s.last_move_score), (0, 0, 0));
        assert_eq!(s.score, 700);
    }
}
