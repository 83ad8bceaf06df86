//! Tetromino (workspace facade crate).
//!
//! The public API is `tetromino::{core,adapter,term,input,engine,types}`; each
//! lives in its own crate under `crates/`.

pub use tetromino_adapter as adapter;
pub use tetromino_core as core;
pub use tetromino_engine as engine;
pub use tetromino_input as input;
pub use tetromino_term as term;
pub use tetromino_types as types;
