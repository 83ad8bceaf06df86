//! Game configuration - the rule variants a session can run with.
//!
//! Defaults reproduce the reference ruleset: wall kicks, a full board wipe on
//! life loss, the 100/300/500/800 line table, uniform random pieces, a one-slot
//! preview and three lives from level 1.

use serde::{Deserialize, Serialize};

use crate::types::{
    CLASSIC_LINE_SCORES, MAX_LEVEL, MAX_PREVIEW, MIN_LEVEL, STANDARD_LINE_SCORES, STARTING_LIVES,
};

/// Which base-points table line clears use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTable {
    /// 100 / 300 / 500 / 800
    #[default]
    Standard,
    /// 40 / 100 / 300 / 1200
    Classic,
}

impl ScoreTable {
    pub fn points(&self) -> &'static [u32; 5] {
        match self {
            ScoreTable::Standard => &STANDARD_LINE_SCORES,
            ScoreTable::Classic => &CLASSIC_LINE_SCORES,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Some(ScoreTable::Standard),
            "classic" => Some(ScoreTable::Classic),
            _ => None,
        }
    }
}

/// How a blocked rotation is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    /// Try the kick table for the transition before giving up
    #[default]
    WallKick,
    /// Same-anchor rotation only
    Naive,
}

impl RotationPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wall_kick" | "wallkick" | "kick" => Some(RotationPolicy::WallKick),
            "naive" => Some(RotationPolicy::Naive),
            _ => None,
        }
    }
}

/// What losing a life clears away before the retry spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeLossPolicy {
    /// Empty the whole board
    #[default]
    WipeBoard,
    /// Keep the board, throw away the blocked piece and try the next one
    DiscardPiece,
}

impl LifeLossPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wipe_board" | "wipe" => Some(LifeLossPolicy::WipeBoard),
            "discard_piece" | "discard" => Some(LifeLossPolicy::DiscardPiece),
            _ => None,
        }
    }
}

/// Piece sequence generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Randomizer {
    /// Independent uniform pick per piece
    #[default]
    Uniform,
    /// Shuffled bags of all seven kinds
    SevenBag,
}

impl Randomizer {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "uniform" | "random" => Some(Randomizer::Uniform),
            "seven_bag" | "bag" | "7bag" => Some(Randomizer::SevenBag),
            _ => None,
        }
    }
}

/// Session rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub start_level: u32,
    pub lives: u8,
    pub score_table: ScoreTable,
    pub rotation: RotationPolicy,
    pub life_loss: LifeLossPolicy,
    pub randomizer: Randomizer,
    pub preview_len: usize,
    pub seed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_level: MIN_LEVEL,
            lives: STARTING_LIVES,
            score_table: ScoreTable::default(),
            rotation: RotationPolicy::default(),
            life_loss: LifeLossPolicy::default(),
            randomizer: Randomizer::default(),
            preview_len: 1,
            seed: 1,
        }
    }
}

impl GameConfig {
    /// Build from `TETROMINO_*` environment variables.
    ///
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let parsed = |key: &str| env::var(key).ok().map(|s| s.trim().to_string());

        let start_level = parsed("TETROMINO_START_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.start_level);
        let lives = parsed("TETROMINO_LIVES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.lives);
        let score_table = parsed("TETROMINO_SCORE_TABLE")
            .and_then(|s| ScoreTable::from_str(&s))
            .unwrap_or(defaults.score_table);
        let rotation = parsed("TETROMINO_ROTATION")
            .and_then(|s| RotationPolicy::from_str(&s))
            .unwrap_or(defaults.rotation);
        let life_loss = parsed("TETROMINO_LIFE_LOSS")
            .and_then(|s| LifeLossPolicy::from_str(&s))
            .unwrap_or(defaults.life_loss);
        let randomizer = parsed("TETROMINO_RANDOMIZER")
            .and_then(|s| Randomizer::from_str(&s))
            .unwrap_or(defaults.randomizer);
        let preview_len = parsed("TETROMINO_PREVIEW")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.preview_len);
        let seed = parsed("TETROMINO_SEED")
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(seed_from_clock);

        Self {
            start_level,
            lives,
            score_table,
            rotation,
            life_loss,
            randomizer,
            preview_len,
            seed,
        }
        .validated()
    }

    /// Clamp every field into its legal range
    pub fn validated(mut self) -> Self {
        self.start_level = self.start_level.clamp(MIN_LEVEL, MAX_LEVEL);
        self.lives = self.lives.max(1);
        self.preview_len = self.preview_len.clamp(1, MAX_PREVIEW);
        self
    }
}

fn seed_from_clock() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
        .unwrap_or(1)
}
