//! Adapter - the game's outward-facing collaborators
//!
//! Everything here sits outside the simulation and can fail without
//! affecting it:
//!
//! - [`submission`]: the score payload offered when a game ends, the
//!   high-score check, and a JSON-lines score log
//! - [`store`]: JSON snapshot persistence and session rehydration
//!
//! # Environment Variables
//!
//! - `TETROMINO_SAVE_PATH`: snapshot file used by [`store::JsonFileStore::from_env`]
//! - `TETROMINO_SCORES_PATH`: score log used by [`submission::JsonlScoreLog::from_env`]
//!
//! # Example
//!
//! ```text
//! {"name":"ada","score":4200,"time":"03:12","level":4}
//! ```

pub mod store;
pub mod submission;

pub use tetromino_core as core;
pub use tetromino_types as types;

pub use store::{decode, encode, restore_session, JsonFileStore, SnapshotStore};
pub use submission::{
    deliver, is_high_score, JsonlScoreLog, ScoreEntry, ScoreSubmission, ScoreSubmitter,
    SubmissionError, MAX_NAME_LEN,
};
