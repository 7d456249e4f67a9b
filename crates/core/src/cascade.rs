//! Cascade resolution - removal, gravity, refill, repeat
//!
//! One round:
//!
//! 1. Score every match at the current cascade level and empty its cells.
//! 2. Gravity: compact each column toward the last row.
//! 3. Refill: top-down, every empty cell gets a fresh gem of uniformly random kind.
//!    No anti-match constraint is applied; this is where chains come from.
//! 4. Re-detect. New matches start the next round at `level + 1`.
//!
//! Rounds run in a loop bounded by `max_rounds`. Running past the cap is reported as
//! [`TooManyCascades`] and the input board is dropped, so callers that resolve a clone
//! keep their committed board intact.

use tracing::{debug, warn};

use crate::board::Board;
use crate::matcher::{find_matches, MatchGroup};
use crate::rng::{GemIdSource, GemRng};
use crate::scoring::match_score;

/// Matches and points of one cascade round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeStep {
    /// 0 for the swap's own matches, k after k refills
    pub level: u32,
    pub matches: Vec<MatchGroup>,
    pub score_delta: u32,
}

/// Result of resolving a move to a stable board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub total_score: u32,
    pub steps: Vec<CascadeStep>,
    /// Fully occupied board with no remaining matches
    pub final_board: Board,
}

impl CascadeOutcome {
    /// Number of rounds resolved (1 when the swap caused no chain)
    pub fn cascade_count(&self) -> u32 {
        self.steps.len() as u32
    }

    /// Every match from every round, in resolution order
    pub fn all_matches(&self) -> Vec<MatchGroup> {
        self.steps
            .iter()
            .flat_map(|s| s.matches.iter().cloned())
            .collect()
    }
}

/// The cascade did not settle within the round cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooManyCascades {
    pub rounds: u32,
}

impl std::fmt::Display for TooManyCascades {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cascade did not settle within {} rounds", self.rounds)
    }
}

impl std::error::Error for TooManyCascades {}

/// Resolve `matches` on `board` until no match remains
///
/// `cascade_level` is the level of the first round (0 for a player swap).
pub fn resolve(
    mut board: Board,
    matches: Vec<MatchGroup>,
    cascade_level: u32,
    max_rounds: u32,
    rng: &mut impl GemRng,
    ids: &mut impl GemIdSource,
) -> Result<CascadeOutcome, TooManyCascades> {
    let mut steps = Vec::new();
    let mut total_score: u32 = 0;
    let mut pending = matches;
    let mut level = cascade_level;

    while !pending.is_empty() {
        if steps.len() as u32 >= max_rounds {
            warn!(rounds = max_rounds, "cascade round cap reached");
            return Err(TooManyCascades { rounds: max_rounds });
        }

        let score_delta = pending
            .iter()
            .map(|m| match_score(m.len(), level))
            .fold(0u32, u32::saturating_add);
        total_score = total_score.saturating_add(score_delta);

        for group in &pending {
            for pos in group.positions() {
                board.take(pos);
            }
        }
        board.apply_gravity();
        refill(&mut board, rng, ids);

        debug!(
            level,
            matches = pending.len(),
            score_delta,
            "cascade round resolved"
        );
        let found = find_matches(&board);
        steps.push(CascadeStep {
            level,
            matches: pending,
            score_delta,
        });
        pending = found;
        level += 1;
    }

    Ok(CascadeOutcome {
        total_score,
        steps,
        final_board: board,
    })
}

/// Fill every empty cell, row-major from the top, with a random gem
///
/// Returns the number of gems created.
pub fn refill(board: &mut Board, rng: &mut impl GemRng, ids: &mut impl GemIdSource) -> usize {
    let empty = board.empty_positions();
    for &pos in &empty {
        board.place(pos, rng.next_kind(), ids.next_id());
    }
    empty.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SequentialIds};
    use crate::types::{GemKind, Position};

    fn board(rows: &[&str], ids: &mut SequentialIds) -> Board {
        Board::from_glyphs(rows, ids).unwrap()
    }

    #[test]
    fn single_round_scores_and_refills() {
        let mut ids = SequentialIds::new();
        let b = board(&["FFFW", "WEWE", "EWEW", "AMAM"], &mut ids);
        let matches = find_matches(&b);
        // Refill the three emptied top cells with kinds that cannot start a chain.
        let mut rng = ScriptedRng::from_kinds(&[GemKind::Nature, GemKind::Magic, GemKind::Air]);

        let outcome = resolve(b, matches, 0, 50, &mut rng, &mut ids).unwrap();
        assert_eq!(outcome.total_score, 50);
        assert_eq!(outcome.cascade_count(), 1);
        assert_eq!(outcome.all_matches().len(), 1);
        assert_eq!(outcome.final_board.to_string(), "NMAW\nWEWE\nEWEW\nAMAM");
        assert!(outcome.final_board.is_full());
        assert!(outcome.final_board.coordinates_consistent());
    }

    #[test]
    fn gravity_then_refill_keeps_survivors() {
        let mut ids = SequentialIds::new();
        // Vertical fire triple in rows 1..4 of column 0; the Water gem above must drop.
        let b = board(&["WAMN", "FMNA", "FNAM", "FAMN"], &mut ids);
        let water = b.gem(Position::new(0, 0)).unwrap();
        let matches = find_matches(&b);
        assert_eq!(matches.len(), 1);

        let mut rng = ScriptedRng::from_kinds(&[GemKind::Earth, GemKind::Lightning, GemKind::Earth]);
        let outcome = resolve(b, matches, 0, 50, &mut rng, &mut ids).unwrap();
        assert_eq!(outcome.final_board.to_string(), "EAMN\nLMNA\nENAM\nWAMN");

        let dropped = outcome.final_board.gem(Position::new(3, 0)).unwrap();
        assert_eq!(dropped.id, water.id);
        assert_eq!((dropped.row, dropped.col), (3, 0));
        assert!(outcome.final_board.coordinates_consistent());
    }

    #[test]
    fn chain_reaction_adds_rush_bonus() {
        let mut ids = SequentialIds::new();
        // Clearing the top fire row moves nothing; an Earth refill at (0,0) then
        // completes column 0.
        let b = board(&["FFFN", "EWAM", "EAWN", "WMNA"], &mut ids);
        let matches = find_matches(&b);
        assert_eq!(matches.len(), 1);

        // Round 0 refill: E at (0,0) completes E/E/E in column 0.
        // Round 1 refill of (0,0), (1,0), (2,0) must be inert: N, M, A.
        let mut rng = ScriptedRng::from_kinds(&[
            GemKind::Earth,
            GemKind::Magic,
            GemKind::Nature,
            GemKind::Nature,
            GemKind::Magic,
            GemKind::Air,
        ]);
        let outcome = resolve(b, matches, 0, 50, &mut rng, &mut ids).unwrap();
        assert_eq!(outcome.cascade_count(), 2);
        assert_eq!(outcome.steps[0].level, 0);
        assert_eq!(outcome.steps[0].score_delta, 50);
        assert_eq!(outcome.steps[1].level, 1);
        assert_eq!(outcome.steps[1].score_delta, 100);
        assert_eq!(outcome.total_score, 150);
        assert!(find_matches(&outcome.final_board).is_empty());
    }

    #[test]
    fn round_cap_is_enforced() {
        let mut ids = SequentialIds::new();
        let b = board(&["FFF", "WEA", "EWN"], &mut ids);
        let matches = find_matches(&b);
        // Every refill is Fire, so the top row re-matches forever.
        let mut rng = ScriptedRng::from_kinds(&[GemKind::Fire]);
        let err = resolve(b, matches, 0, 5, &mut rng, &mut ids).unwrap_err();
        assert_eq!(err, TooManyCascades { rounds: 5 });
    }

    #[test]
    fn starting_level_scales_first_round() {
        let mut ids = SequentialIds::new();
        let b = board(&["FFFW", "WEWE", "EWEW", "AMAM"], &mut ids);
        let matches = find_matches(&b);
        let mut rng = ScriptedRng::from_kinds(&[GemKind::Nature, GemKind::Magic, GemKind::Air]);
        let outcome = resolve(b, matches, 2, 50, &mut rng, &mut ids).unwrap();
        assert_eq!(outcome.total_score, 150);
        assert_eq!(outcome.steps[0].level, 2);
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut ids = SequentialIds::new();
        let b = board(&["FWF", "WFW", "FWF"], &mut ids);
        let mut rng = ScriptedRng::from_kinds(&[GemKind::Fire]);
        let outcome = resolve(b.clone(), Vec::new(), 0, 50, &mut rng, &mut ids).unwrap();
        assert_eq!(outcome.total_score, 0);
        assert_eq!(outcome.cascade_count(), 0);
        assert_eq!(outcome.final_board, b);
    }

    #[test]
    fn refill_is_top_down_row_major() {
        let mut ids = SequentialIds::new();
        let mut b = board(&["FWE", "AWE", "NLM"], &mut ids);
        b.take(Position::new(0, 2));
        b.take(Position::new(0, 0));
        let mut rng = ScriptedRng::from_kinds(&[GemKind::Magic, GemKind::Nature]);
        assert_eq!(refill(&mut b, &mut rng, &mut ids), 2);
        assert_eq!(b.kind_at(Position::new(0, 0)), Some(GemKind::Magic));
        assert_eq!(b.kind_at(Position::new(0, 2)), Some(GemKind::Nature));
    }
}
