//! Board module - manages the gem grid
//!
//! The board is a `size x size` grid where each cell is empty or holds a gem.
//! Uses a flat row-major vector; `size` is fixed at construction.
//! Coordinates: `(row, col)`, row 0 at the top, gravity pulls toward the last row.
//!
//! Every primitive that moves a gem (`place`, `swap`, `apply_gravity`) re-stamps the
//! gem's stored `(row, col)`, so a gem's coordinates always equal its cell.

use std::fmt;

use crate::rng::GemIdSource;
use crate::types::{Cell, Gem, GemId, GemKind, Position};

/// The game board - `size` columns x `size` rows using flat storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    /// Flat vector of cells, row-major order (row * size + col)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Build a fully occupied board from rows of kinds
    ///
    /// Returns `None` unless `rows` is square and non-empty.
    pub fn from_kinds(rows: &[Vec<GemKind>], ids: &mut impl GemIdSource) -> Option<Self> {
        let size = rows.len();
        if size == 0 || rows.iter().any(|r| r.len() != size) {
            return None;
        }
        let mut board = Self::new(size);
        for (row, kinds) in rows.iter().enumerate() {
            for (col, &kind) in kinds.iter().enumerate() {
                board.place(Position::new(row, col), kind, ids.next_id());
            }
        }
        Some(board)
    }

    /// Parse a board from glyph rows such as `"FWEA"` (see [`GemKind::glyph`])
    pub fn from_glyphs(rows: &[&str], ids: &mut impl GemIdSource) -> Option<Self> {
        let kinds: Option<Vec<Vec<GemKind>>> = rows
            .iter()
            .map(|r| r.chars().map(GemKind::from_glyph).collect())
            .collect();
        Self::from_kinds(&kinds?, ids)
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: Position) -> Option<usize> {
        pos.in_bounds(self.size)
            .then(|| pos.row * self.size + pos.col)
    }

    /// Edge length of the board
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get cell at `pos`
    /// Returns None if out of bounds
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Gem at `pos`, if in bounds and occupied
    pub fn gem(&self, pos: Position) -> Option<Gem> {
        self.get(pos).flatten()
    }

    /// Kind of the gem at `pos`, if any
    pub fn kind_at(&self, pos: Position) -> Option<GemKind> {
        self.gem(pos).map(|g| g.kind)
    }

    /// Check if position is within bounds and filled
    pub fn is_occupied(&self, pos: Position) -> bool {
        matches!(self.get(pos), Some(Some(_)))
    }

    /// Put a new gem at `pos`, replacing whatever was there
    /// Returns false if out of bounds
    pub fn place(&mut self, pos: Position, kind: GemKind, id: GemId) -> bool {
        self.set(pos, Some(Gem::new(kind, id, pos)))
    }

    /// Set cell at `pos`, re-stamping the gem's coordinates
    /// Returns false if out of bounds
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = cell.map(|g| Gem::new(g.kind, g.id, pos));
                true
            }
            None => false,
        }
    }

    /// Empty the cell at `pos`, returning its previous content
    pub fn take(&mut self, pos: Position) -> Cell {
        let idx = self.index(pos)?;
        self.cells[idx].take()
    }

    /// Exchange the contents of two cells
    /// Returns false (and leaves the board untouched) if either is out of bounds
    pub fn swap(&mut self, a: Position, b: Position) -> bool {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return false;
        };
        self.cells.swap(ia, ib);
        self.restamp(ia);
        self.restamp(ib);
        true
    }

    fn restamp(&mut self, idx: usize) {
        let pos = Position::new(idx / self.size, idx % self.size);
        if let Some(gem) = self.cells[idx].as_mut() {
            gem.row = pos.row;
            gem.col = pos.col;
        }
    }

    /// Compact every column toward the last row, keeping relative order
    ///
    /// Uses a two-pointer pass per column (read upward, write upward). Vacated cells end
    /// up at the top. Returns the number of gems that moved.
    pub fn apply_gravity(&mut self) -> usize {
        let mut moved = 0;
        for col in 0..self.size {
            let mut write_row = self.size;
            for read_row in (0..self.size).rev() {
                let read_idx = read_row * self.size + col;
                if self.cells[read_idx].is_none() {
                    continue;
                }
                write_row -= 1;
                if write_row != read_row {
                    let write_idx = write_row * self.size + col;
                    self.cells[write_idx] = self.cells[read_idx].take();
                    self.restamp(write_idx);
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Positions of all empty cells, row-major (top-down)
    pub fn empty_positions(&self) -> Vec<Position> {
        self.positions().filter(|p| !self.is_occupied(*p)).collect()
    }

    /// True when every cell holds a gem
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// True when every gem's stored coordinates match its cell
    pub fn coordinates_consistent(&self) -> bool {
        self.cells.iter().enumerate().all(|(idx, cell)| match cell {
            Some(g) => g.row == idx / self.size && g.col == idx % self.size,
            None => true,
        })
    }

    /// All positions, row-major
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let size = self.size;
        (0..size * size).map(move |idx| Position::new(idx / size, idx % size))
    }

    /// Get a reference to the internal cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Rows of cells, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Kinds grid, for comparisons that ignore ids
    pub fn kinds(&self) -> Vec<Vec<Option<GemKind>>> {
        self.rows()
            .map(|row| row.iter().map(|c| c.map(|g| g.kind)).collect())
            .collect()
    }
}

impl fmt::Display for Board {
    /// One line per row, one glyph per cell, `.` for empty cells
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                let c = cell.map(|g| g.kind.glyph()).unwrap_or('.');
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}
