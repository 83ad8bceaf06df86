//! Piece controller - the active piece and its interaction with the board
//!
//! The controller never touches board cells except in [`PieceController::lock_into`];
//! every movement is validated through [`Board::collides`].

use tracing::debug;

use crate::board::Board;
use crate::catalog::{get_shape, kick_offsets, ShapeMatrix};
use crate::config::RotationPolicy;
use crate::types::{PieceKind, Rotation, BOARD_WIDTH};

/// Lifecycle of the active piece. Locking destroys it, so there is no
/// `Locked` variant: the controller is simply empty afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiecePhase {
    /// Installed, has not moved down yet
    Spawned,
    /// Has moved down at least once
    Falling,
    /// A downward move failed; the next landing step locks it
    Landed,
}

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    /// Anchor of the shape's bounding box
    pub x: i8,
    pub y: i8,
}

impl ActivePiece {
    /// Catalog entry for the current rotation
    pub fn shape(&self) -> &'static ShapeMatrix {
        get_shape(self.kind, self.rotation)
    }

    /// Absolute board coordinates of the four minos
    pub fn cells(&self) -> [(i8, i8); 4] {
        self.shape()
            .minos()
            .map(|(dx, dy)| (self.x + dx, self.y + dy))
    }
}

/// Owns the active piece between spawn and lock
#[derive(Debug, Clone)]
pub struct PieceController {
    active: Option<ActivePiece>,
    phase: PiecePhase,
    rotation: RotationPolicy,
}

impl PieceController {
    pub fn new(rotation: RotationPolicy) -> Self {
        Self {
            active: None,
            phase: PiecePhase::Spawned,
            rotation,
        }
    }

    /// Spawn anchor for a kind: centered, top row, rotation 0
    pub fn spawn_position(kind: PieceKind) -> (i8, i8) {
        let width = get_shape(kind, Rotation::North).width() as i8;
        ((BOARD_WIDTH as i8) / 2 - width / 2, 0)
    }

    /// Install `kind` at its spawn position.
    ///
    /// Returns false (and installs nothing) when the spawn cells are blocked.
    pub fn spawn(&mut self, board: &Board, kind: PieceKind) -> bool {
        let (x, y) = Self::spawn_position(kind);
        let piece = ActivePiece {
            kind,
            rotation: Rotation::North,
            x,
            y,
        };
        if board.collides(piece.shape(), x, y) {
            debug!(?kind, x, y, "spawn blocked");
            self.active = None;
            return false;
        }
        self.install(piece);
        true
    }

    /// Install a piece as-is (rehydration); the caller validated it
    pub fn install(&mut self, piece: ActivePiece) {
        self.active = Some(piece);
        self.phase = PiecePhase::Spawned;
    }

    /// Commit a translation iff the candidate position is free.
    ///
    /// A failed downward move marks the piece as landed.
    pub fn try_move(&mut self, board: &Board, dx: i8, dy: i8) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let (nx, ny) = (piece.x + dx, piece.y + dy);
        if board.collides(piece.shape(), nx, ny) {
            if dy > 0 {
                self.phase = PiecePhase::Landed;
            }
            return false;
        }
        piece.x = nx;
        piece.y = ny;
        if dy > 0 {
            self.phase = PiecePhase::Falling;
        }
        true
    }

    /// Rotate clockwise once, kicking per the configured policy.
    ///
    /// Leaves the piece untouched when every candidate collides.
    pub fn rotate(&mut self, board: &Board) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let to = piece.rotation.rotate_cw();
        let shape = get_shape(piece.kind, to);

        let candidates: &[(i8, i8)] = match self.rotation {
            RotationPolicy::WallKick => kick_offsets(piece.kind, piece.rotation),
            RotationPolicy::Naive => &[(0, 0)],
        };

        for &(kx, ky) in candidates {
            let (nx, ny) = (piece.x + kx, piece.y + ky);
            if !board.collides(shape, nx, ny) {
                if (kx, ky) != (0, 0) {
                    debug!(kind = ?piece.kind, kx, ky, "wall kick");
                }
                piece.rotation = to;
                piece.x = nx;
                piece.y = ny;
                return true;
            }
        }
        false
    }

    /// Resting y of the active piece if it fell straight down
    pub fn ghost_y(&self, board: &Board) -> Option<i8> {
        let piece = self.active?;
        let shape = piece.shape();
        let mut y = piece.y;
        while !board.collides(shape, piece.x, y + 1) {
            y += 1;
        }
        Some(y)
    }

    /// Move down until blocked; returns the rows travelled.
    ///
    /// The piece is left landed; locking is the session's job.
    pub fn hard_drop(&mut self, board: &Board) -> u32 {
        let Some(target) = self.ghost_y(board) else {
            return 0;
        };
        let Some(piece) = self.active.as_mut() else {
            return 0;
        };
        let rows = (target - piece.y) as u32;
        piece.y = target;
        self.phase = PiecePhase::Landed;
        rows
    }

    /// Write the active piece into the board and destroy it
    pub fn lock_into(&mut self, board: &mut Board) -> Option<ActivePiece> {
        let piece = self.active.take()?;
        board.lock(piece.shape(), piece.x, piece.y, piece.kind);
        self.phase = PiecePhase::Spawned;
        Some(piece)
    }

    /// Drop the active piece without locking it
    pub fn clear(&mut self) {
        self.active = None;
        self.phase = PiecePhase::Spawned;
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn phase(&self) -> PiecePhase {
        self.phase
    }
}
