//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds the whole falling-piece simulation. It has **no
//! dependencies** on terminals, files or threads:
//!
//! - **Deterministic**: the same seed and the same inputs replay the same game
//! - **Clock-free**: time only advances through [`GameSession::tick`]
//! - **Allocation-light**: board, shapes and queues are fixed-size arrays
//!
//! # Module Structure
//!
//! - [`catalog`]: the seven tetrominoes, their precomputed rotations and kick tables
//! - [`board`]: 10x20 grid with collision and locking primitives
//! - [`controller`]: the active piece (spawn, move, rotate, hard drop)
//! - [`line_clear`]: removes full rows and reports the count
//! - [`scoring`]: points, levels and the gravity interval
//! - [`rng`]: uniform and 7-bag piece generation behind a preview queue
//! - [`session`]: the spawn / fall / lock / clear / respawn cycle and lives
//! - [`snapshot`]: serializable session state with validation
//! - [`config`]: rule variants
//! - [`render`]: the render callback interface
//!
//! # Example
//!
//! ```
//! use tetromino_core::{GameConfig, GameSession};
//! use tetromino_core::types::{GameAction, SessionPhase};
//!
//! let mut game = GameSession::new(GameConfig::default());
//! game.start();
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::Rotate);
//! game.apply_action(GameAction::HardDrop);
//!
//! assert_eq!(game.phase(), SessionPhase::Playing);
//! assert_eq!(game.board().filled_count(), 4);
//! ```
//!
//! # Timing
//!
//! Call [`GameSession::tick`] every frame with the elapsed milliseconds. A
//! piece falls one row each time the accumulated time reaches the level's
//! drop interval (1000ms at level 1, 100ms less per level, never below 100ms).

pub mod board;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod line_clear;
pub mod render;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use tetromino_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use catalog::{get_shape, kick_offsets, PieceCatalog, ShapeMatrix};
pub use config::{GameConfig, LifeLossPolicy, Randomizer, RotationPolicy, ScoreTable};
pub use controller::{ActivePiece, PieceController, PiecePhase};
pub use error::{CoreError, CoreResult};
pub use line_clear::LineClearer;
pub use render::{Frame, RenderSink, SinkError};
pub use rng::{PieceQueue, SimpleRng};
pub use scoring::{drop_interval_ms, line_clear_points, ClearOutcome, ScoreState};
pub use session::{format_time, Advice, FinalResult, GameSession, SessionEvent};
pub use snapshot::{ActiveSnapshot, GameSnapshot, SnapshotError};
