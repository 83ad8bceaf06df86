//! Scoring module - line clear points, leveling and gravity speed
//!
//! Points for a clear are `table[lines] * level`, always at the level the
//! clear happened on; a level-up triggered by that same clear only affects
//! later clears. Every ten accumulated lines raise the level by one up to
//! [`MAX_LEVEL`]; filling the accumulator again at the top level completes
//! the game.

use tracing::info;

use crate::config::ScoreTable;
use crate::types::{
    BASE_DROP_MS, DROP_INTERVAL_MIN_MS, DROP_STEP_MS, LINES_PER_LEVEL, MAX_LEVEL, MIN_LEVEL,
};

/// Points for clearing `lines` rows at `level`.
/// Zero lines (or more than four) score nothing.
pub fn line_clear_points(table: ScoreTable, lines: u32, level: u32) -> u32 {
    let points = table.points();
    match points.get(lines as usize) {
        Some(&base) => base.saturating_mul(level),
        None => 0,
    }
}

/// Gravity interval: 1000ms at level 1, 100ms faster per level, floored at 100ms
pub fn drop_interval_ms(level: u32) -> u32 {
    let steps = level.saturating_sub(MIN_LEVEL);
    BASE_DROP_MS
        .saturating_sub(steps.saturating_mul(DROP_STEP_MS))
        .max(DROP_INTERVAL_MIN_MS)
}

/// Result of feeding one clear into the score machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearOutcome {
    pub delta: u32,
    pub leveled_up: bool,
    pub completed: bool,
}

/// Score, level and drop speed for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreState {
    score: u32,
    level: u32,
    lines_this_level: u32,
    total_lines: u32,
    drop_interval_ms: u32,
    table: ScoreTable,
}

impl ScoreState {
    pub fn new(table: ScoreTable, start_level: u32) -> Self {
        let level = start_level.clamp(MIN_LEVEL, MAX_LEVEL);
        Self {
            score: 0,
            level,
            lines_this_level: 0,
            total_lines: 0,
            drop_interval_ms: drop_interval_ms(level),
            table,
        }
    }

    /// Rebuild from persisted counters; the interval is derived, never stored
    pub fn restore(
        table: ScoreTable,
        score: u32,
        level: u32,
        lines_this_level: u32,
        total_lines: u32,
    ) -> Self {
        let level = level.clamp(MIN_LEVEL, MAX_LEVEL);
        Self {
            score,
            level,
            lines_this_level,
            total_lines,
            drop_interval_ms: drop_interval_ms(level),
            table,
        }
    }

    /// Account for `lines` cleared by one lock
    pub fn apply_clear(&mut self, lines: u32) -> ClearOutcome {
        if lines == 0 {
            return ClearOutcome::default();
        }

        let delta = line_clear_points(self.table, lines, self.level);
        self.score = self.score.saturating_add(delta);
        self.total_lines += lines;
        self.lines_this_level += lines;

        let mut outcome = ClearOutcome {
            delta,
            ..ClearOutcome::default()
        };

        if self.lines_this_level >= LINES_PER_LEVEL {
            if self.level >= MAX_LEVEL {
                outcome.completed = true;
                info!(score = self.score, "final level cleared");
            } else {
                self.level += 1;
                self.lines_this_level -= LINES_PER_LEVEL;
                self.drop_interval_ms = drop_interval_ms(self.level);
                outcome.leveled_up = true;
                info!(
                    level = self.level,
                    drop_interval_ms = self.drop_interval_ms,
                    "level up"
                );
            }
        }

        outcome
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines_this_level(&self) -> u32 {
        self.lines_this_level
    }

    pub fn total_lines(&self) -> u32 {
        self.total_lines
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval_ms
    }

    pub fn table(&self) -> ScoreTable {
        self.table
    }
}
