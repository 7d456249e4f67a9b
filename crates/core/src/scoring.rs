//! Scoring module - match points and level targets
//!
//! Base points grow with run length:
//!
//! | Run | Base |
//! |-----|------|
//! | 3 | 50 |
//! | 4 | 150 |
//! | 5 | 300 |
//! | 6 | 500 |
//! | n > 6 | 500 + 100 * (n - 6) |
//!
//! A match found at cascade level `k` earns `base * (1 + k)`: the swap's own matches
//! (level 0) score plain base points, and every chained round adds a "rush bonus" of
//! `k * base`.

use crate::types::{MIN_MATCH_LEN, TARGET_LEVEL_STEP, TARGET_PER_LEVEL};

/// Base points by run length (index = length)
pub const MATCH_BASE_SCORES: [u32; 7] = [0, 0, 0, 50, 150, 300, 500];

/// Points added per gem beyond six
pub const LONG_RUN_STEP: u32 = 100;

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchScore {
    /// Points for the run length alone
    pub base: u32,
    /// `cascade_level * base`
    pub rush_bonus: u32,
    pub total: u32,
}

/// Base points for a run of `size` gems (0 for runs shorter than three)
pub fn base_score(size: usize) -> u32 {
    if size < MIN_MATCH_LEN {
        return 0;
    }
    match MATCH_BASE_SCORES.get(size) {
        Some(&points) => points,
        None => {
            let extra = u32::try_from(size - 6).unwrap_or(u32::MAX);
            MATCH_BASE_SCORES[6].saturating_add(LONG_RUN_STEP.saturating_mul(extra))
        }
    }
}

/// Full breakdown for one match at `cascade_level`
pub fn score_match(size: usize, cascade_level: u32) -> MatchScore {
    let base = base_score(size);
    let rush_bonus = base.saturating_mul(cascade_level);
    MatchScore {
        base,
        rush_bonus,
        total: base.saturating_add(rush_bonus),
    }
}

/// Points for one match of `size` gems at `cascade_level`
pub fn match_score(size: usize, cascade_level: u32) -> u32 {
    score_match(size, cascade_level).total
}

/// Score needed to complete `level`: `level * 1000 + (level - 1) * 500`
///
/// Level 0 is treated as level 1.
pub fn target_score(level: u32) -> u32 {
    let level = level.max(1);
    TARGET_PER_LEVEL
        .saturating_mul(level)
        .saturating_add(TARGET_LEVEL_STEP.saturating_mul(level - 1))
}
