//! Terminal front end.
//!
//! A small renderer for playing in a terminal, without widget libraries:
//!
//! - [`fb`]: styled character framebuffer
//! - [`game_view`]: pure layout of a session [`Frame`](tetromino_core::Frame) into a framebuffer
//! - [`renderer`]: flushes framebuffers to the terminal, redrawing only changed rows,
//!   and plugs into the session as its render sink

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tetromino_core as core;
pub use tetromino_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, VIEW_HEIGHT, VIEW_WIDTH};
pub use renderer::{encode_rows_into, TerminalGuard, TerminalRenderer};
