//! Engine - drives a [`GameSession`](tetromino_core::GameSession) in real time.
//!
//! - [`runner`]: the cooperative frame loop. One session mutation per frame,
//!   no frames while paused or finished, and pending frames cancelled on restart.
//! - [`worker`]: optional background worker on its own tokio runtime. Its
//!   answers are advice; the session's synchronous results always win.

pub mod runner;
pub mod worker;

pub use tetromino_core as core;
pub use tetromino_types as types;

pub use runner::{Runner, ScheduledTick};
pub use worker::{Worker, WorkerRequest, WorkerResponse};
