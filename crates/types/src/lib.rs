//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (rules, engine state machine, wire protocol).
//!
//! # Board Geometry
//!
//! Boards are square. Positions are `(row, col)`, zero-based, with row 0 at the top
//! and column 0 on the left. Gravity pulls gems toward the highest row index.
//!
//! # Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_BOARD_SIZE` | 8 | Board edge used when none is configured |
//! | `MIN_BOARD_SIZE` | 3 | Smallest board that can hold a match |
//! | `MAX_BOARD_SIZE` | 16 | Largest board accepted by the engine |
//! | `MIN_MATCH_LEN` | 3 | Shortest run that counts as a match |
//! | `DEFAULT_GENERATION_ATTEMPTS` | 100 | Random fills tried before constrained placement |
//! | `FALLBACK_TRIES_PER_CELL` | 20 | Candidates tried per cell by constrained placement |
//! | `MAX_CASCADE_ROUNDS` | 50 | Hard cap on chained cascade rounds per move |
//!
//! # Examples
//!
//! ```
//! use gem_cascade_types::{GemKind, Position};
//!
//! let kind = GemKind::from_str("Fire").unwrap();
//! assert_eq!(kind, GemKind::Fire);
//! assert_eq!(kind.as_str(), "fire");
//!
//! let a = Position::new(3, 4);
//! assert!(a.is_adjacent(Position::new(3, 5)));
//! assert!(!a.is_adjacent(Position::new(4, 5)));
//! ```

/// Board edge used when none is configured
pub const DEFAULT_BOARD_SIZE: usize = 8;

/// Smallest accepted board edge
pub const MIN_BOARD_SIZE: usize = 3;

/// Largest accepted board edge
pub const MAX_BOARD_SIZE: usize = 16;

/// Shortest run of equal gems that counts as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Number of distinct gem kinds
pub const GEM_KIND_COUNT: usize = 7;

/// Random whole-board fills tried before falling back to constrained placement
pub const DEFAULT_GENERATION_ATTEMPTS: u32 = 100;

/// Candidate kinds tried per cell during constrained placement
pub const FALLBACK_TRIES_PER_CELL: u32 = 20;

/// Hard cap on cascade rounds resolved for a single move
pub const MAX_CASCADE_ROUNDS: u32 = 50;

/// First level of a fresh game
pub const STARTING_LEVEL: u32 = 1;

/// Target score contribution per level (`level * 1000`)
pub const TARGET_PER_LEVEL: u32 = 1000;

/// Target score step added for every level after the first (`(level - 1) * 500`)
pub const TARGET_LEVEL_STEP: u32 = 500;

/// The seven gem kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GemKind {
    Fire,
    Water,
    Earth,
    Air,
    Lightning,
    Nature,
    Magic,
}

impl GemKind {
    /// All kinds in declaration order
    pub const ALL: [GemKind; GEM_KIND_COUNT] = [
        GemKind::Fire,
        GemKind::Water,
        GemKind::Earth,
        GemKind::Air,
        GemKind::Lightning,
        GemKind::Nature,
        GemKind::Magic,
    ];

    /// Map an index in `0..GEM_KIND_COUNT` to a kind
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position of this kind in [`GemKind::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parse gem kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use gem_cascade_types::GemKind;
    ///
    /// assert_eq!(GemKind::from_str("water"), Some(GemKind::Water));
    /// assert_eq!(GemKind::from_str("MAGIC"), Some(GemKind::Magic));
    /// assert_eq!(GemKind::from_str("unknown"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fire" => Some(GemKind::Fire),
            "water" => Some(GemKind::Water),
            "earth" => Some(GemKind::Earth),
            "air" => Some(GemKind::Air),
            "lightning" => Some(GemKind::Lightning),
            "nature" => Some(GemKind::Nature),
            "magic" => Some(GemKind::Magic),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            GemKind::Fire => "fire",
            GemKind::Water => "water",
            GemKind::Earth => "earth",
            GemKind::Air => "air",
            GemKind::Lightning => "lightning",
            GemKind::Nature => "nature",
            GemKind::Magic => "magic",
        }
    }

    /// Single-letter glyph used by text renderings of a board
    pub fn glyph(&self) -> char {
        match self {
            GemKind::Fire => 'F',
            GemKind::Water => 'W',
            GemKind::Earth => 'E',
            GemKind::Air => 'A',
            GemKind::Lightning => 'L',
            GemKind::Nature => 'N',
            GemKind::Magic => 'M',
        }
    }

    /// Inverse of [`GemKind::glyph`] (case-insensitive)
    pub fn from_glyph(c: char) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.glyph() == c.to_ascii_uppercase())
    }
}

/// Opaque, stable gem identifier
///
/// Ids are handed out by an id source owned by whoever creates gems; two gems alive on
/// the same board never share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GemId(pub u64);

/// A gem sitting in a board cell
///
/// `row`/`col` always equal the cell the gem occupies; the board re-stamps them on
/// every move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gem {
    pub kind: GemKind,
    pub id: GemId,
    pub row: usize,
    pub col: usize,
}

impl Gem {
    pub fn new(kind: GemKind, id: GemId, pos: Position) -> Self {
        Self {
            kind,
            id,
            row: pos.row,
            col: pos.col,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// A cell on the board
///
/// - `None`: empty (only transiently, while a cascade is being resolved)
/// - `Some(Gem)`: occupied
pub type Cell = Option<Gem>;

/// Board coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance between two positions
    pub fn manhattan(&self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// True when exactly one axis differs, by exactly one
    pub fn is_adjacent(&self, other: Position) -> bool {
        self.manhattan(other) == 1
    }

    /// Check if the position lies on a `size x size` board
    pub fn in_bounds(&self, size: usize) -> bool {
        self.row < size && self.col < size
    }

    /// Right-hand neighbour, if on the board
    pub fn right(&self, size: usize) -> Option<Position> {
        (self.col + 1 < size).then(|| Position::new(self.row, self.col + 1))
    }

    /// Neighbour below, if on the board
    pub fn down(&self, size: usize) -> Option<Position> {
        (self.row + 1 < size).then(|| Position::new(self.row + 1, self.col))
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

/// Lifecycle status of a game
///
/// - **Idle**: not initialized yet (or cleaned up)
/// - **Playing**: accepting moves
/// - **Paused**: moves rejected until resumed
/// - **Completed**: target score reached; waiting for the next level
/// - **Failed**: ended by a collaborator (move or time exhaustion)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    #[default]
    Idle,
    Playing,
    Paused,
    Completed,
    Failed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Idle => "idle",
            GameStatus::Playing => "playing",
            GameStatus::Paused => "paused",
            GameStatus::Completed => "completed",
            GameStatus::Failed => "failed",
        }
    }

    /// Parse status from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "idle" => Some(GameStatus::Idle),
            "playing" => Some(GameStatus::Playing),
            "paused" => Some(GameStatus::Paused),
            "completed" => Some(GameStatus::Completed),
            "failed" => Some(GameStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
