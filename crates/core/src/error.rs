//! Error types for catalog misuse.
//!
//! Spawn collisions are not errors; they surface as session events.

use thiserror::Error;

/// Precondition violations raised by the piece catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid piece type: {0:?}")]
    InvalidPieceType(String),

    #[error("invalid rotation index: {0} (expected 0-3)")]
    InvalidRotation(u8),
}

pub type CoreResult<T> = Result<T, CoreError>;
