//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell can be empty or filled with a piece kind.
//! Uses a flat array for better cache locality and zero-allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).
//! Rows above the grid (y < 0) are open space: nothing is ever stored there, and
//! nothing there ever blocks a piece.

use arrayvec::ArrayVec;
use tracing::debug;

use crate::catalog::ShapeMatrix;
use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Row indices removed by one clear, bottom to top
pub type ClearedRows = ArrayVec<u8, { BOARD_HEIGHT as usize }>;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
    /// Set whenever locked cells change; cleared by the renderer
    dirty: bool,
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
            dirty: true,
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    /// Get width of the board
    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    /// Get height of the board
    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Whether (x, y) blocks a mino.
    ///
    /// Left, right and below the grid count as occupied; anything above the
    /// top row (y < 0) never does.
    #[inline]
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        if x < 0 || x >= BOARD_WIDTH as i8 || y >= BOARD_HEIGHT as i8 {
            return true;
        }
        if y < 0 {
            return false;
        }
        self.cells[(y as usize) * (BOARD_WIDTH as usize) + (x as usize)].is_some()
    }

    /// True iff any occupied cell of `shape` anchored at (x, y) lands on an
    /// occupied or out-of-bounds board cell.
    pub fn collides(&self, shape: &ShapeMatrix, x: i8, y: i8) -> bool {
        shape
            .minos()
            .iter()
            .any(|&(dx, dy)| self.is_occupied(x + dx, y + dy))
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        let start = y * BOARD_WIDTH as usize;
        let end = start + BOARD_WIDTH as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Write `kind` into every cell covered by `shape` at (x, y).
    ///
    /// The caller has already checked `!collides(..)`. Minos above the top row
    /// have nowhere to go and are dropped; the return value counts them.
    pub fn lock(&mut self, shape: &ShapeMatrix, x: i8, y: i8, kind: PieceKind) -> u8 {
        let mut hidden = 0;
        for &(dx, dy) in shape.minos() {
            if !self.set(x + dx, y + dy, Some(kind)) {
                hidden += 1;
            }
        }
        self.dirty = true;
        if hidden > 0 {
            debug!(?kind, x, y, hidden, "locked piece partly above the board");
        }
        hidden
    }

    /// Clear all full rows and return the row indices that were cleared (sorted bottom to top)
    ///
    /// Every full row is removed in one pass; the surviving rows keep their
    /// order and drop down, and empty rows fill the top. Uses a two-pointer
    /// walk with no allocation.
    pub fn clear_full_rows(&mut self) -> ClearedRows {
        let mut cleared_rows = ClearedRows::new();
        let width = BOARD_WIDTH as usize;
        let mut write_y = BOARD_HEIGHT as usize;

        // Scan from bottom to top
        for read_y in (0..BOARD_HEIGHT as usize).rev() {
            if self.is_row_full(read_y) {
                cleared_rows.push(read_y as u8);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * width;
                    let dst_start = write_y * width;
                    self.cells
                        .copy_within(src_start..src_start + width, dst_start);
                }
            }
        }

        // Clear the remaining rows at the top
        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }

        if !cleared_rows.is_empty() {
            self.dirty = true;
        }
        cleared_rows
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One row of cells, top row first
    pub fn row(&self, y: usize) -> &[Cell] {
        let start = y * BOARD_WIDTH as usize;
        &self.cells[start..start + BOARD_WIDTH as usize]
    }

    /// Number of filled cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Acknowledge that the current cells have been drawn
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Write the grid as piece codes (0 = empty)
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        (0..BOARD_HEIGHT as usize)
            .map(|y| {
                self.row(y)
                    .iter()
                    .map(|c| c.map_or(0, |k| k.code()))
                    .collect()
            })
            .collect()
    }

    /// Create from a 2D vector for testing (converts to flat array)
    #[cfg(test)]
    pub fn from_cells(cells_2d: Vec<Vec<Cell>>) -> Self {
        assert_eq!(cells_2d.len(), BOARD_HEIGHT as usize);
        assert!(cells_2d.iter().all(|row| row.len() == BOARD_WIDTH as usize));

        let mut flat = [None; BOARD_SIZE];
        for (y, row) in cells_2d.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                flat[y * BOARD_WIDTH as usize + x] = *cell;
            }
        }
        Self {
            cells: flat,
            dirty: true,
        }
    }

    /// Convert to 2D vector for testing/display
    #[cfg(test)]
    pub fn to_cells(&self) -> Vec<Vec<Cell>> {
        (0..BOARD_HEIGHT as usize)
            .map(|y| self.row(y).to_vec())
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
