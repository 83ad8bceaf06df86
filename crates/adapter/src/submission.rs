//! Score submission.
//!
//! When a game ends the session exposes its final result; a player name turns
//! it into a [`ScoreSubmission`]. Delivery goes through a [`ScoreSubmitter`],
//! and a failed delivery is logged and forgotten.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::{FinalResult, GameSession};

/// Longest accepted player name, in characters
pub const MAX_NAME_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("a name is required")]
    MissingName,

    #[error("name is {0} characters, at most {} allowed", MAX_NAME_LEN)]
    NameTooLong(usize),

    #[error("game has not finished")]
    NotFinished,
}

/// Payload sent to a scores service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u32,
    /// Play time as `MM:SS`
    pub time: String,
    pub level: u32,
}

impl ScoreSubmission {
    pub fn new(name: &str, result: &FinalResult) -> Result<Self, SubmissionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SubmissionError::MissingName);
        }
        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(SubmissionError::NameTooLong(len));
        }
        Ok(Self {
            name: name.to_string(),
            score: result.score,
            time: result.time(),
            level: result.level,
        })
    }

    /// Build from a finished session
    pub fn from_session(name: &str, session: &GameSession) -> Result<Self, SubmissionError> {
        let result = session.final_result().ok_or(SubmissionError::NotFinished)?;
        Self::new(name, &result)
    }
}

/// One row of a high-score list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    #[serde(default)]
    pub time: String,
}

impl From<&ScoreSubmission> for ScoreEntry {
    fn from(submission: &ScoreSubmission) -> Self {
        Self {
            name: submission.name.clone(),
            score: submission.score,
            time: submission.time.clone(),
        }
    }
}

/// A score makes the list if the list is empty or it beats the lowest entry
pub fn is_high_score(score: u32, entries: &[ScoreEntry]) -> bool {
    match entries.iter().map(|e| e.score).min() {
        Some(lowest) => score > lowest,
        None => true,
    }
}

/// Somewhere scores go
pub trait ScoreSubmitter {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<()>;
}

/// Submit, logging instead of propagating failures
pub fn deliver(submitter: &mut dyn ScoreSubmitter, submission: &ScoreSubmission) -> bool {
    match submitter.submit(submission) {
        Ok(()) => {
            info!(name = %submission.name, score = submission.score, "score submitted");
            true
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "score submission failed");
            false
        }
    }
}

/// Appends submissions to a JSON-lines file and reads them back as a list
#[derive(Debug, Clone)]
pub struct JsonlScoreLog {
    path: PathBuf,
}

impl JsonlScoreLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// From `TETROMINO_SCORES_PATH`, if set and non-empty
    pub fn from_env() -> Option<Self> {
        std::env::var("TETROMINO_SCORES_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every recorded entry, best first. Unreadable lines are skipped.
    pub fn entries(&self) -> Result<Vec<ScoreEntry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("opening {}", self.path.display()))
            }
        };
        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.with_context(|| format!("reading {}", self.path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ScoreEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(err) => warn!(error = %err, "skipping malformed score line"),
            }
        }
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(entries)
    }
}

impl ScoreSubmitter for JsonlScoreLog {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        let line = serde_json::to_string(submission)?;
        writeln!(file, "{line}").with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}
