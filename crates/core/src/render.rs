//! Render callback - what a session hands to whoever draws it.

use thiserror::Error;

use crate::board::Board;
use crate::controller::ActivePiece;
use crate::types::{PieceKind, SessionPhase};

/// Borrowed view of everything needed to draw one frame
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub board: &'a Board,
    pub active: Option<ActivePiece>,
    pub ghost_y: Option<i8>,
    /// Upcoming pieces, next first
    pub preview: &'a [PieceKind],
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub lives: u8,
    pub phase: SessionPhase,
    pub elapsed_ms: u64,
    /// Locked cells changed since the last frame was rendered
    pub board_dirty: bool,
}

impl Frame<'_> {
    /// The piece that spawns next
    pub fn next(&self) -> Option<PieceKind> {
        self.preview.first().copied()
    }
}

/// A sink failed to draw. Never affects the simulation.
#[derive(Debug, Error)]
#[error("render sink failed: {0}")]
pub struct SinkError(pub String);

impl SinkError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Receives a frame after every state change
pub trait RenderSink {
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), SinkError>;
}

impl<F> RenderSink for F
where
    F: FnMut(&Frame<'_>) -> Result<(), SinkError>,
{
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), SinkError> {
        self(frame)
    }
}
