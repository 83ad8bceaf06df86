//! Snapshot persistence.
//!
//! Snapshots are stored as JSON. Loading never produces a half-valid session:
//! [`restore_session`] either rebuilds the saved game or falls back to a fresh
//! one and logs why.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::{GameConfig, GameSession, GameSnapshot};

/// Somewhere a snapshot can be kept between runs
pub trait SnapshotStore {
    fn save(&mut self, snapshot: &GameSnapshot) -> Result<()>;

    /// `Ok(None)` when nothing has been saved
    fn load(&self) -> Result<Option<GameSnapshot>>;

    fn clear(&mut self) -> Result<()>;
}

pub fn encode(snapshot: &GameSnapshot) -> Result<String> {
    serde_json::to_string(snapshot).context("encoding snapshot")
}

pub fn decode(text: &str) -> Result<GameSnapshot> {
    serde_json::from_str(text).context("decoding snapshot")
}

/// One JSON file holding the latest snapshot
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// From `TETROMINO_SAVE_PATH`, if set and non-empty
    pub fn from_env() -> Option<Self> {
        std::env::var("TETROMINO_SAVE_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&mut self, snapshot: &GameSnapshot) -> Result<()> {
        let text = encode(snapshot)?;
        // Write beside the target and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<GameSnapshot>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        decode(&text).map(Some)
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

/// The saved game if it is usable, otherwise a fresh session
pub fn restore_session(store: &dyn SnapshotStore, config: GameConfig) -> GameSession {
    match store.load() {
        Ok(snapshot) => GameSession::restore_or_new(snapshot.as_ref(), config),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "could not load saved game");
            GameSession::new(config)
        }
    }
}
