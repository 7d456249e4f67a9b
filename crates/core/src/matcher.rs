//! Match detection - finds horizontal and vertical runs of three or more gems
//!
//! Two independent linear scans:
//!
//! 1. **Horizontal**: each row left to right. Every run of `MIN_MATCH_LEN` or more is
//!    emitted and its cells are marked claimed.
//! 2. **Vertical**: each column top to bottom. A run is dropped only when *every* cell in
//!    it was already claimed by a horizontal run; partially claimed runs are kept, so the
//!    vertical arm of an L or T shape still scores.
//!
//! Empty cells break runs. Output order is all horizontal groups (row-major) followed by
//! all vertical groups (column-major).

use crate::board::Board;
use crate::types::{Gem, GemKind, Position, MIN_MATCH_LEN};

/// Axis of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

/// One contiguous collinear run of same-kind gems
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchGroup {
    pub kind: GemKind,
    pub orientation: Orientation,
    /// Gems in scan order (left to right, or top to bottom)
    pub gems: Vec<Gem>,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.gems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gems.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.gems.iter().map(Gem::position)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.positions().any(|p| p == pos)
    }
}

/// Scan the board for every match, horizontal runs first
pub fn find_matches(board: &Board) -> Vec<MatchGroup> {
    let size = board.size();
    let mut groups = Vec::new();
    let mut claimed = vec![false; size * size];

    for row in 0..size {
        let line: Vec<Position> = (0..size).map(|col| Position::new(row, col)).collect();
        for run in runs_in_line(board, &line) {
            for gem in &run {
                claimed[gem.row * size + gem.col] = true;
            }
            groups.push(MatchGroup {
                kind: run[0].kind,
                orientation: Orientation::Horizontal,
                gems: run,
            });
        }
    }

    for col in 0..size {
        let line: Vec<Position> = (0..size).map(|row| Position::new(row, col)).collect();
        for run in runs_in_line(board, &line) {
            if run.iter().all(|g| claimed[g.row * size + g.col]) {
                continue;
            }
            groups.push(MatchGroup {
                kind: run[0].kind,
                orientation: Orientation::Vertical,
                gems: run,
            });
        }
    }

    groups
}

/// True when the board holds at least one run of `MIN_MATCH_LEN`
///
/// Short-circuits on the first run; horizontal precedence cannot hide a run entirely,
/// so this agrees with `!find_matches(board).is_empty()`.
pub fn has_match(board: &Board) -> bool {
    let size = board.size();
    let run_at = |cells: &mut dyn Iterator<Item = Position>| -> bool {
        let mut prev: Option<GemKind> = None;
        let mut len = 0usize;
        for pos in cells {
            match board.kind_at(pos) {
                Some(kind) if Some(kind) == prev => len += 1,
                Some(kind) => {
                    prev = Some(kind);
                    len = 1;
                }
                None => {
                    prev = None;
                    len = 0;
                }
            }
            if len >= MIN_MATCH_LEN {
                return true;
            }
        }
        false
    };

    (0..size).any(|row| run_at(&mut (0..size).map(|col| Position::new(row, col))))
        || (0..size).any(|col| run_at(&mut (0..size).map(|row| Position::new(row, col))))
}

/// All maximal runs of `MIN_MATCH_LEN` or more along one line of cells
fn runs_in_line(board: &Board, line: &[Position]) -> Vec<Vec<Gem>> {
    let mut runs = Vec::new();
    let mut current: Vec<Gem> = Vec::new();

    for &pos in line {
        match board.gem(pos) {
            Some(gem) if current.last().is_some_and(|g| g.kind == gem.kind) => {
                current.push(gem);
            }
            cell => {
                if current.len() >= MIN_MATCH_LEN {
                    runs.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                if let Some(gem) = cell {
                    current.push(gem);
                }
            }
        }
    }
    if current.len() >= MIN_MATCH_LEN {
        runs.push(current);
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequentialIds;

    fn board(rows: &[&str]) -> Board {
        let mut ids = SequentialIds::new();
        Board::from_glyphs(rows, &mut ids).unwrap()
    }

    #[test]
    fn no_matches_on_checkerboard() {
        let b = board(&["FWFW", "WFWF", "FWFW", "WFWF"]);
        assert!(find_matches(&b).is_empty());
        assert!(!has_match(&b));
    }

    #[test]
    fn single_horizontal_triple() {
        let b = board(&["FFFW", "WEWE", "EWEW", "AMAM"]);
        let groups = find_matches(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, GemKind::Fire);
        assert_eq!(groups[0].orientation, Orientation::Horizontal);
        assert_eq!(groups[0].len(), 3);
        assert!(groups[0].contains(Position::new(0, 2)));
        assert!(has_match(&b));
    }

    #[test]
    fn run_at_end_of_line_is_flushed() {
        let b = board(&["WEEE", "WAMA", "NAMN", "AMAM"]);
        let groups = find_matches(&b);
        assert_eq!(groups.len(), 1);
        let cols: Vec<usize> = groups[0].positions().map(|p| p.col).collect();
        assert_eq!(cols, vec![1, 2, 3]);
    }

    #[test]
    fn vertical_run_of_four() {
        let b = board(&["WEAN", "WAMA", "WNMN", "WMAM"]);
        let groups = find_matches(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].orientation, Orientation::Vertical);
        assert_eq!(groups[0].len(), 4);
        let rows: Vec<usize> = groups[0].positions().map(|p| p.row).collect();
        assert_eq!(rows, vec![0, 1, 2, 3]);
    }

    #[test]
    fn l_shape_keeps_partially_claimed_vertical() {
        // Horizontal FFF on row 0 shares (0,0) with vertical FFF in column 0.
        let b = board(&["FFFW", "FEWE", "FWEW", "AMAM"]);
        let groups = find_matches(&b);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].orientation, Orientation::Horizontal);
        assert_eq!(groups[1].orientation, Orientation::Vertical);
        assert_eq!(groups[1].len(), 3);
    }

    #[test]
    fn fully_claimed_vertical_is_discarded() {
        // Three stacked horizontal triples: every vertical run in columns 0..3 lies
        // entirely on claimed cells.
        let b = board(&["FFFW", "FFFE", "FFFW", "AMAM"]);
        let groups = find_matches(&b);
        assert_eq!(groups.len(), 3);
        assert!(groups
            .iter()
            .all(|g| g.orientation == Orientation::Horizontal));
    }

    #[test]
    fn empty_cells_break_runs() {
        let mut b = board(&["FFWF", "WEAE", "EWEW", "AMAM"]);
        b.set(Position::new(0, 2), None);
        assert!(find_matches(&b).is_empty());
        assert!(!has_match(&b));
    }

    #[test]
    fn output_order_is_rows_then_columns() {
        let b = board(&["WEAN", "NNNA", "WMAM", "EEEM"]);
        let groups = find_matches(&b);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].gems[0].row, 1);
        assert_eq!(groups[1].gems[0].row, 3);
    }
}
