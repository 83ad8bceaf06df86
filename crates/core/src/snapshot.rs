//! Persisted session snapshots.
//!
//! A snapshot is plain serde data so any store can hold it. Everything that
//! came from outside is re-validated by [`GameSnapshot::validate`] before a
//! session is rebuilt from it: grid dimensions, cell codes, piece names,
//! rotation indices, counters, and finally whether the active piece still fits
//! on the restored board.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Board;
use crate::catalog::PieceCatalog;
use crate::controller::ActivePiece;
use crate::error::CoreError;
use crate::types::{
    PieceKind, Rotation, SessionPhase, BOARD_HEIGHT, BOARD_WIDTH, LINES_PER_LEVEL, MAX_LEVEL,
    MIN_LEVEL,
};

/// Why a snapshot was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("board has {0} rows, expected {}", BOARD_HEIGHT)]
    BoardHeight(usize),

    #[error("board row {row} has {len} cells, expected {}", BOARD_WIDTH)]
    BoardWidth { row: usize, len: usize },

    #[error("board cell ({x}, {y}) holds unknown code {code}")]
    UnknownCell { x: usize, y: usize, code: u8 },

    #[error("unknown phase {0:?}")]
    UnknownPhase(String),

    #[error("invalid piece type: {0:?}")]
    InvalidPieceType(String),

    #[error("invalid rotation index: {0}")]
    InvalidRotation(u8),

    #[error("level {0} outside {}..={}", MIN_LEVEL, MAX_LEVEL)]
    LevelOutOfRange(u32),

    #[error("{0} lives is outside the allowed range")]
    LivesOutOfRange(u8),

    #[error(
        "{lines_this_level} lines toward the next level with {total_lines} in total, expected fewer than {}",
        LINES_PER_LEVEL
    )]
    AccumulatorOutOfRange { lines_this_level: u32, total_lines: u32 },

    #[error("next-piece queue is empty")]
    EmptyNextQueue,

    #[error("active piece overlaps the board")]
    ActiveCollides,

    #[error("finished game still has an active piece")]
    TerminalWithActive,
}

impl From<CoreError> for SnapshotError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPieceType(name) => SnapshotError::InvalidPieceType(name),
            CoreError::InvalidRotation(index) => SnapshotError::InvalidRotation(index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub kind: String,
    pub rotation: u8,
    pub x: i8,
    pub y: i8,
}

impl From<&ActivePiece> for ActiveSnapshot {
    fn from(piece: &ActivePiece) -> Self {
        Self {
            kind: piece.kind.as_str().to_string(),
            rotation: piece.rotation.index() as u8,
            x: piece.x,
            y: piece.y,
        }
    }
}

/// Serializable session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: String,
    /// Piece codes per cell, top row first (0 = empty)
    pub board: Vec<Vec<u8>>,
    pub score: u32,
    pub level: u32,
    #[serde(default)]
    pub lines_this_level: u32,
    #[serde(default)]
    pub total_lines: u32,
    pub lives: u8,
    #[serde(default)]
    pub elapsed_ms: u64,
    pub active: Option<ActiveSnapshot>,
    pub next: Vec<String>,
    #[serde(default)]
    pub seed: u32,
    /// Remainder of the current seven-bag, drawn from the back
    #[serde(default)]
    pub bag: Vec<String>,
}

/// A snapshot that passed validation, in core types
#[derive(Debug, Clone)]
pub struct Restored {
    pub phase: SessionPhase,
    pub board: Board,
    pub active: Option<ActivePiece>,
    pub next: Vec<PieceKind>,
    pub score: u32,
    pub level: u32,
    pub lines_this_level: u32,
    pub total_lines: u32,
    pub lives: u8,
    pub elapsed_ms: u64,
    pub seed: u32,
    pub bag: Vec<PieceKind>,
}

impl GameSnapshot {
    /// Check every field and convert into core types
    pub fn validate(&self) -> Result<Restored, SnapshotError> {
        let phase = SessionPhase::from_str(&self.phase)
            .ok_or_else(|| SnapshotError::UnknownPhase(self.phase.clone()))?;
        let board = self.decode_board()?;

        if !(MIN_LEVEL..=MAX_LEVEL).contains(&self.level) {
            return Err(SnapshotError::LevelOutOfRange(self.level));
        }
        let in_progress = matches!(phase, SessionPhase::Playing | SessionPhase::Paused);
        if in_progress && self.lives == 0 {
            return Err(SnapshotError::LivesOutOfRange(self.lives));
        }
        // Only a completed game may have filled the accumulator.
        let full = self.lines_this_level >= LINES_PER_LEVEL && phase != SessionPhase::Completed;
        if full || self.total_lines < self.lines_this_level {
            return Err(SnapshotError::AccumulatorOutOfRange {
                lines_this_level: self.lines_this_level,
                total_lines: self.total_lines,
            });
        }

        let next = decode_kinds(&self.next)?;
        if next.is_empty() {
            return Err(SnapshotError::EmptyNextQueue);
        }

        let active = match &self.active {
            Some(snap) => {
                let piece = decode_active(snap)?;
                if phase.is_terminal() {
                    return Err(SnapshotError::TerminalWithActive);
                }
                if board.collides(piece.shape(), piece.x, piece.y) {
                    return Err(SnapshotError::ActiveCollides);
                }
                Some(piece)
            }
            None => None,
        };

        Ok(Restored {
            phase,
            board,
            active,
            next,
            score: self.score,
            level: self.level,
            lines_this_level: self.lines_this_level,
            total_lines: self.total_lines,
            lives: self.lives,
            elapsed_ms: self.elapsed_ms,
            seed: self.seed,
            bag: decode_kinds(&self.bag)?,
        })
    }

    fn decode_board(&self) -> Result<Board, SnapshotError> {
        if self.board.len() != BOARD_HEIGHT as usize {
            return Err(SnapshotError::BoardHeight(self.board.len()));
        }
        let mut board = Board::new();
        for (y, row) in self.board.iter().enumerate() {
            if row.len() != BOARD_WIDTH as usize {
                return Err(SnapshotError::BoardWidth { row: y, len: row.len() });
            }
            for (x, &code) in row.iter().enumerate() {
                if code == 0 {
                    continue;
                }
                let kind = PieceKind::from_code(code)
                    .ok_or(SnapshotError::UnknownCell { x, y, code })?;
                board.set(x as i8, y as i8, Some(kind));
            }
        }
        Ok(board)
    }
}

fn decode_kinds(names: &[String]) -> Result<Vec<PieceKind>, SnapshotError> {
    names
        .iter()
        .map(|name| {
            PieceKind::from_str(name).ok_or_else(|| SnapshotError::InvalidPieceType(name.clone()))
        })
        .collect()
}

fn decode_active(snap: &ActiveSnapshot) -> Result<ActivePiece, SnapshotError> {
    // Goes through the catalog so naming errors match catalog misuse.
    PieceCatalog::global().shape_named(&snap.kind, snap.rotation)?;
    let kind = PieceKind::from_str(&snap.kind)
        .ok_or_else(|| SnapshotError::InvalidPieceType(snap.kind.clone()))?;
    let rotation =
        Rotation::from_index(snap.rotation).ok_or(SnapshotError::InvalidRotation(snap.rotation))?;
    Ok(ActivePiece {
        kind,
        rotation,
        x: snap.x,
        y: snap.y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_snapshot() -> GameSnapshot {
        GameSnapshot {
            phase: "playing".to_string(),
            board: vec![vec![0; 10]; 20],
            score: 1200,
            level: 2,
            lines_this_level: 3,
            total_lines: 13,
            lives: 2,
            elapsed_ms: 61_000,
            active: Some(ActiveSnapshot {
                kind: "T".to_string(),
                rotation: 1,
                x: 4,
                y: 5,
            }),
            next: vec!["O".to_string()],
            seed: 42,
            bag: Vec::new(),
        }
    }

    #[test]
    fn test_valid_snapshot() {
        let restored = empty_snapshot().validate().unwrap();
        assert_eq!(restored.phase, SessionPhase::Playing);
        assert_eq!(restored.active.map(|p| p.rotation), Some(Rotation::East));
        assert_eq!(restored.next, vec![PieceKind::O]);
    }

    #[test]
    fn test_rejects_wrong_dimensions() {
        let mut snap = empty_snapshot();
        snap.board.pop();
        assert_eq!(snap.validate().unwrap_err(), SnapshotError::BoardHeight(19));

        let mut snap = empty_snapshot();
        snap.board[3].push(0);
        assert_eq!(
            snap.validate().unwrap_err(),
            SnapshotError::BoardWidth { row: 3, len: 11 }
        );
    }

    #[test]
    fn test_rejects_bad_pieces() {
        let mut snap = empty_snapshot();
        snap.next = vec!["Q".to_string()];
        assert_eq!(
            snap.validate().unwrap_err(),
            SnapshotError::InvalidPieceType("Q".to_string())
        );

        let mut snap = empty_snapshot();
        if let Some(active) = snap.active.as_mut() {
            active.rotation = 7;
        }
        assert_eq!(snap.validate().unwrap_err(), SnapshotError::InvalidRotation(7));

        let mut snap = empty_snapshot();
        snap.board[0][0] = 9;
        assert_eq!(
            snap.validate().unwrap_err(),
            SnapshotError::UnknownCell { x: 0, y: 0, code: 9 }
        );
    }

    #[test]
    fn test_rejects_colliding_active() {
        let mut snap = empty_snapshot();
        // T east occupies (4,5), (4,6), (5,6), (4,7)
        snap.board[6][5] = PieceKind::S.code();
        assert_eq!(snap.validate().unwrap_err(), SnapshotError::ActiveCollides);
    }

    #[test]
    fn test_rejects_impossible_accumulator() {
        let mut snap = empty_snapshot();
        snap.lines_this_level = 10;
        snap.total_lines = 40;
        assert_eq!(
            snap.validate().unwrap_err(),
            SnapshotError::AccumulatorOutOfRange {
                lines_this_level: 10,
                total_lines: 40
            }
        );

        let mut snap = empty_snapshot();
        snap.total_lines = 2;
        assert!(matches!(
            snap.validate(),
            Err(SnapshotError::AccumulatorOutOfRange { .. })
        ));

        // A completed game ends with the accumulator full.
        let mut snap = empty_snapshot();
        snap.phase = "completed".to_string();
        snap.active = None;
        snap.level = 10;
        snap.lines_this_level = 12;
        snap.total_lines = 102;
        assert!(snap.validate().is_ok());
    }

    #[test]
    fn test_terminal_rules() {
        let mut snap = empty_snapshot();
        snap.phase = "over".to_string();
        assert_eq!(snap.validate().unwrap_err(), SnapshotError::TerminalWithActive);

        snap.active = None;
        snap.lives = 0;
        assert!(snap.validate().is_ok());
    }
}
