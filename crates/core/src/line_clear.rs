//! Line clearer - the only path from a locked board to a line count.
//!
//! Keeps the score machine from ever touching board cells.

use tracing::debug;

use crate::board::Board;

#[derive(Debug, Default, Clone, Copy)]
pub struct LineClearer;

impl LineClearer {
    /// Remove every full row and report how many went
    pub fn process(&self, board: &mut Board) -> u32 {
        let cleared = board.clear_full_rows();
        if !cleared.is_empty() {
            debug!(rows = ?cleared.as_slice(), "cleared rows");
        }
        cleared.len() as u32
    }
}
