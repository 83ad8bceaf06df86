//! Terminal input module.
//!
//! Independent of any UI framework: maps `crossterm` key events onto
//! [`crate::types::GameAction`]s, which the session exposes as plain method
//! calls. There is no key repeat handling; each press is one command.

pub mod map;

pub use tetromino_types as types;

pub use map::{handle_key_event, should_quit};
