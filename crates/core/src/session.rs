//! Game session - the spawn / fall / lock / clear / respawn cycle
//!
//! `GameSession` owns every piece of mutable game state. It is driven from
//! outside by [`GameSession::tick`] with explicit elapsed milliseconds (never
//! the wall clock), plus the input methods. Everything noteworthy that happens
//! is queued as a [`SessionEvent`] for the driver to drain, and every state
//! change is pushed to the optional [`RenderSink`].
//!
//! Phases:
//!
//! ```text
//! Start -> Playing -> { Paused <-> Playing } -> { GameOver | Completed } -> Start
//! ```

use tracing::{debug, info, warn};

use crate::board::Board;
use crate::config::{GameConfig, LifeLossPolicy, Randomizer};
use crate::controller::{ActivePiece, PieceController};
use crate::line_clear::LineClearer;
use crate::render::{Frame, RenderSink};
use crate::rng::PieceQueue;
use crate::scoring::{line_clear_points, ScoreState};
use crate::snapshot::{ActiveSnapshot, GameSnapshot, SnapshotError};
use crate::types::{GameAction, LockEvent, PieceKind, SessionPhase};

/// Something the driver or UI may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Started { episode: u32 },
    Spawned(PieceKind),
    Locked(LockEvent),
    LevelUp { level: u32 },
    LifeLost { lives_left: u8 },
    Paused,
    Resumed,
    GameOver(FinalResult),
    Completed(FinalResult),
    QuitToStart,
}

/// What a finished game is remembered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalResult {
    /// `GameOver` or `Completed`
    pub outcome: SessionPhase,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub elapsed_ms: u64,
}

impl FinalResult {
    /// Play time as `MM:SS`
    pub fn time(&self) -> String {
        format_time(self.elapsed_ms)
    }
}

/// Format milliseconds of play as `MM:SS`
pub fn format_time(elapsed_ms: u64) -> String {
    let secs = elapsed_ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Result of background computation offered back to the session.
///
/// Advice is never authoritative: score checks are only compared against
/// what the session already computed, and suggested pieces only fill the
/// newest preview slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    ScoreCheck { lines: u32, level: u32, delta: u32 },
    NextPiece(PieceKind),
}

/// One game, from the start screen to the final result
pub struct GameSession {
    config: GameConfig,
    phase: SessionPhase,
    board: Board,
    controller: PieceController,
    queue: PieceQueue,
    scoring: ScoreState,
    clearer: LineClearer,
    lives: u8,
    drop_timer_ms: u32,
    elapsed_ms: u64,
    /// Monotonic episode id (increments on every start)
    episode_id: u32,
    events: Vec<SessionEvent>,
    sink: Option<Box<dyn RenderSink>>,
    final_result: Option<FinalResult>,
}

impl GameSession {
    /// A session waiting on the start screen
    pub fn new(config: GameConfig) -> Self {
        let config = config.validated();
        Self {
            phase: SessionPhase::Start,
            board: Board::new(),
            controller: PieceController::new(config.rotation),
            queue: PieceQueue::new(config.randomizer, config.seed, config.preview_len),
            scoring: ScoreState::new(config.score_table, config.start_level),
            clearer: LineClearer,
            lives: config.lives,
            drop_timer_ms: 0,
            elapsed_ms: 0,
            episode_id: 0,
            events: Vec::new(),
            sink: None,
            final_result: None,
            config,
        }
    }

    /// Leave the start screen and spawn the first piece
    pub fn start(&mut self) -> bool {
        if self.phase != SessionPhase::Start {
            return false;
        }
        self.begin();
        true
    }

    /// Start over after a finished game.
    ///
    /// Refused while a game is in progress.
    pub fn restart(&mut self) -> bool {
        match self.phase {
            SessionPhase::Start | SessionPhase::GameOver | SessionPhase::Completed => {
                self.begin();
                true
            }
            SessionPhase::Playing | SessionPhase::Paused => false,
        }
    }

    fn begin(&mut self) {
        // Continue the RNG stream so consecutive games differ.
        let seed = self.queue.seed();
        self.queue = PieceQueue::new(self.config.randomizer, seed, self.config.preview_len);
        self.board.clear();
        self.controller.clear();
        self.scoring = ScoreState::new(self.config.score_table, self.config.start_level);
        self.lives = self.config.lives;
        self.drop_timer_ms = 0;
        self.elapsed_ms = 0;
        self.final_result = None;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.phase = SessionPhase::Playing;

        info!(
            episode = self.episode_id,
            level = self.scoring.level(),
            lives = self.lives,
            "game started"
        );
        self.events.push(SessionEvent::Started {
            episode: self.episode_id,
        });
        self.spawn_next();
        self.notify();
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != SessionPhase::Playing {
            return false;
        }
        self.phase = SessionPhase::Paused;
        self.events.push(SessionEvent::Paused);
        debug!("paused");
        self.notify();
        true
    }

    /// Resume play; the time spent paused never counts toward the next drop
    pub fn resume(&mut self) -> bool {
        if self.phase != SessionPhase::Paused {
            return false;
        }
        self.phase = SessionPhase::Playing;
        self.drop_timer_ms = 0;
        self.events.push(SessionEvent::Resumed);
        debug!("resumed");
        self.notify();
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            SessionPhase::Playing => self.pause(),
            SessionPhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Abandon a paused game and go back to the start screen
    pub fn quit(&mut self) -> bool {
        if self.phase != SessionPhase::Paused {
            return false;
        }
        self.controller.clear();
        self.board.clear();
        self.phase = SessionPhase::Start;
        self.events.push(SessionEvent::QuitToStart);
        info!(score = self.scoring.score(), "quit to start");
        self.notify();
        true
    }

    /// Advance the clock by `elapsed_ms`.
    ///
    /// Moves the piece down at most one row per call, once the drop interval
    /// has been reached. Returns true if the board or piece changed.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if self.phase != SessionPhase::Playing {
            return false;
        }
        self.elapsed_ms += u64::from(elapsed_ms);
        self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);
        if self.drop_timer_ms < self.scoring.drop_interval_ms() {
            return false;
        }
        self.drop_timer_ms = 0;
        self.step_down();
        self.notify();
        true
    }

    fn step_down(&mut self) {
        if self.controller.active().is_none() {
            return;
        }
        if !self.controller.try_move(&self.board, 0, 1) {
            self.land();
        }
    }

    fn playable(&self) -> bool {
        self.phase == SessionPhase::Playing && self.controller.active().is_some()
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1)
    }

    fn shift(&mut self, dx: i8) -> bool {
        if !self.playable() {
            return false;
        }
        let moved = self.controller.try_move(&self.board, dx, 0);
        if moved {
            self.notify();
        }
        moved
    }

    /// One row down by hand; lands the piece when blocked
    pub fn soft_drop(&mut self) -> bool {
        if !self.playable() {
            return false;
        }
        if self.controller.try_move(&self.board, 0, 1) {
            self.drop_timer_ms = 0;
        } else {
            self.land();
        }
        self.notify();
        true
    }

    pub fn rotate(&mut self) -> bool {
        if !self.playable() {
            return false;
        }
        let rotated = self.controller.rotate(&self.board);
        if rotated {
            self.notify();
        }
        rotated
    }

    /// Drop to the resting row and run the landing sequence once
    pub fn hard_drop(&mut self) -> bool {
        if !self.playable() {
            return false;
        }
        let rows = self.controller.hard_drop(&self.board);
        debug!(rows, "hard drop");
        self.land();
        self.notify();
        true
    }

    /// Dispatch an input command
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::Rotate => self.rotate(),
            GameAction::Pause => self.toggle_pause(),
            GameAction::Restart => self.restart(),
        }
    }

    /// Lock, clear, score, then spawn or finish
    fn land(&mut self) {
        let level = self.scoring.level();
        let Some(piece) = self.controller.lock_into(&mut self.board) else {
            return;
        };
        let lines = self.clearer.process(&mut self.board);
        let outcome = self.scoring.apply_clear(lines);

        let event = LockEvent {
            kind: piece.kind,
            lines_cleared: lines,
            level,
            score_delta: outcome.delta,
            leveled_up: outcome.leveled_up,
            completed: outcome.completed,
        };
        debug!(kind = ?piece.kind, x = piece.x, y = piece.y, lines, "piece locked");
        self.events.push(SessionEvent::Locked(event));
        if outcome.leveled_up {
            self.events.push(SessionEvent::LevelUp {
                level: self.scoring.level(),
            });
        }

        if outcome.completed {
            self.finish(SessionPhase::Completed);
        } else {
            self.spawn_next();
        }
    }

    fn spawn_next(&mut self) {
        let kind = self.queue.draw();
        if self.controller.spawn(&self.board, kind) {
            self.events.push(SessionEvent::Spawned(kind));
            return;
        }
        self.lose_life(kind);
    }

    /// A spawn was blocked: pay a life and retry once
    fn lose_life(&mut self, blocked: PieceKind) {
        self.lives = self.lives.saturating_sub(1);
        info!(lives_left = self.lives, ?blocked, "life lost");
        self.events.push(SessionEvent::LifeLost {
            lives_left: self.lives,
        });
        if self.lives == 0 {
            self.finish(SessionPhase::GameOver);
            return;
        }

        let retry = match self.config.life_loss {
            LifeLossPolicy::WipeBoard => {
                self.board.clear();
                blocked
            }
            LifeLossPolicy::DiscardPiece => self.queue.draw(),
        };
        if self.controller.spawn(&self.board, retry) {
            self.events.push(SessionEvent::Spawned(retry));
        } else {
            self.finish(SessionPhase::GameOver);
        }
    }

    fn finish(&mut self, outcome: SessionPhase) {
        debug_assert!(outcome.is_terminal());
        self.controller.clear();
        self.phase = outcome;
        let result = FinalResult {
            outcome,
            score: self.scoring.score(),
            level: self.scoring.level(),
            lines: self.scoring.total_lines(),
            elapsed_ms: self.elapsed_ms,
        };
        self.final_result = Some(result);
        info!(
            outcome = outcome.as_str(),
            score = result.score,
            level = result.level,
            time = %result.time(),
            "game finished"
        );
        self.events.push(match outcome {
            SessionPhase::Completed => SessionEvent::Completed(result),
            _ => SessionEvent::GameOver(result),
        });
    }

    /// Reconcile a background result with the session's own state
    pub fn apply_advice(&mut self, advice: Advice) -> bool {
        match advice {
            Advice::ScoreCheck {
                lines,
                level,
                delta,
            } => {
                let expected = line_clear_points(self.config.score_table, lines, level);
                if expected != delta {
                    warn!(lines, level, delta, expected, "worker score disagrees, ignored");
                }
                false
            }
            Advice::NextPiece(kind) => {
                // A suggestion would break the one-of-each guarantee of a bag.
                if self.phase != SessionPhase::Playing
                    || self.config.randomizer != Randomizer::Uniform
                {
                    return false;
                }
                self.queue.replace_newest(kind);
                debug!(?kind, "next piece suggested");
                self.notify();
                true
            }
        }
    }

    /// Attach the render callback
    pub fn set_render_sink(&mut self, sink: Box<dyn RenderSink>) {
        self.sink = Some(sink);
        self.notify();
    }

    pub fn take_render_sink(&mut self) -> Option<Box<dyn RenderSink>> {
        self.sink.take()
    }

    fn notify(&mut self) {
        let Some(mut sink) = self.sink.take() else {
            return;
        };
        if let Err(err) = sink.render(&self.frame()) {
            warn!(error = %err, "render failed");
        }
        self.sink = Some(sink);
        self.board.mark_clean();
    }

    /// Everything a renderer needs for the current state
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            board: &self.board,
            active: self.controller.active().copied(),
            ghost_y: self.controller.ghost_y(&self.board),
            preview: self.queue.preview(),
            score: self.scoring.score(),
            level: self.scoring.level(),
            lines: self.scoring.total_lines(),
            lives: self.lives,
            phase: self.phase,
            elapsed_ms: self.elapsed_ms,
            board_dirty: self.board.is_dirty(),
        }
    }

    /// Hand queued events to the caller
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, SessionEvent> {
        self.events.drain(..)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for tools and tests
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.controller.active()
    }

    pub fn ghost_y(&self) -> Option<i8> {
        self.controller.ghost_y(&self.board)
    }

    pub fn next_piece(&self) -> PieceKind {
        self.queue.peek()
    }

    pub fn preview(&self) -> &[PieceKind] {
        self.queue.preview()
    }

    pub fn score(&self) -> u32 {
        self.scoring.score()
    }

    pub fn level(&self) -> u32 {
        self.scoring.level()
    }

    pub fn lines_this_level(&self) -> u32 {
        self.scoring.lines_this_level()
    }

    pub fn total_lines(&self) -> u32 {
        self.scoring.total_lines()
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.scoring.drop_interval_ms()
    }

    pub fn drop_timer_ms(&self) -> u32 {
        self.drop_timer_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn final_result(&self) -> Option<FinalResult> {
        self.final_result
    }

    pub fn final_score(&self) -> Option<u32> {
        self.final_result.map(|r| r.score)
    }

    pub fn final_time(&self) -> Option<String> {
        self.final_result.map(|r| r.time())
    }

    pub fn final_level(&self) -> Option<u32> {
        self.final_result.map(|r| r.level)
    }

    /// Capture the persisted form of this session
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase.as_str().to_string(),
            board: self.board.to_codes(),
            score: self.scoring.score(),
            level: self.scoring.level(),
            lines_this_level: self.scoring.lines_this_level(),
            total_lines: self.scoring.total_lines(),
            lives: self.lives,
            elapsed_ms: self.elapsed_ms,
            active: self.controller.active().map(ActiveSnapshot::from),
            next: self
                .queue
                .preview()
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
            seed: self.queue.seed(),
            bag: self
                .queue
                .bag()
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
        }
    }

    /// Rebuild a session from a snapshot.
    ///
    /// A game that was in progress comes back paused. A missing active piece
    /// is replaced by spawning the next one.
    pub fn from_snapshot(snapshot: &GameSnapshot, config: GameConfig) -> Result<Self, SnapshotError> {
        let restored = snapshot.validate()?;
        let mut session = Self::new(config);
        if restored.lives > session.config.lives {
            return Err(SnapshotError::LivesOutOfRange(restored.lives));
        }

        session.board = restored.board;
        session.scoring = ScoreState::restore(
            session.config.score_table,
            restored.score,
            restored.level,
            restored.lines_this_level,
            restored.total_lines,
        );
        session.lives = restored.lives;
        session.elapsed_ms = restored.elapsed_ms;
        let seed = if restored.seed == 0 {
            session.config.seed
        } else {
            restored.seed
        };
        session.queue = PieceQueue::with_preview(
            session.config.randomizer,
            seed,
            &restored.next,
            &restored.bag,
        );
        session.episode_id = 1;

        match restored.phase {
            SessionPhase::Playing | SessionPhase::Paused => {
                session.phase = SessionPhase::Paused;
                match restored.active {
                    Some(piece) => session.controller.install(piece),
                    None => {
                        // Spawning may cost a life or end the game like any other spawn.
                        session.phase = SessionPhase::Playing;
                        session.spawn_next();
                        if session.phase == SessionPhase::Playing {
                            session.phase = SessionPhase::Paused;
                        }
                    }
                }
            }
            SessionPhase::GameOver | SessionPhase::Completed => {
                session.phase = restored.phase;
                session.final_result = Some(FinalResult {
                    outcome: restored.phase,
                    score: restored.score,
                    level: session.scoring.level(),
                    lines: restored.total_lines,
                    elapsed_ms: restored.elapsed_ms,
                });
            }
            SessionPhase::Start => {}
        }

        info!(
            phase = session.phase.as_str(),
            score = session.score(),
            level = session.level(),
            "session restored"
        );
        Ok(session)
    }

    /// Restore when possible, otherwise start fresh
    pub fn restore_or_new(snapshot: Option<&GameSnapshot>, config: GameConfig) -> Self {
        match snapshot.map(|s| Self::from_snapshot(s, config.clone())) {
            Some(Ok(session)) => session,
            Some(Err(err)) => {
                warn!(error = %err, "discarding saved game");
                Self::new(config)
            }
            None => Self::new(config),
        }
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.phase)
            .field("score", &self.scoring.score())
            .field("level", &self.scoring.level())
            .field("lives", &self.lives)
            .field("active", &self.controller.active())
            .field("episode_id", &self.episode_id)
            .finish_non_exhaustive()
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SinkError;
    use crate::types::MAX_LEVEL;

    fn playing() -> GameSession {
        let mut session = GameSession::default();
        assert!(session.start());
        session
    }

    /// Occupy the spawn area so the next spawn is blocked
    fn block_spawn(session: &mut GameSession) {
        for y in 0..2 {
            for x in 3..7 {
                session.board_mut().set(x, y, Some(PieceKind::Z));
            }
        }
    }

    #[test]
    fn test_start_spawns_piece() {
        let mut session = playing();
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert!(session.active().is_some());
        let events: Vec<_> = session.drain_events().collect();
        assert_eq!(events[0], SessionEvent::Started { episode: 1 });
        assert!(matches!(events[1], SessionEvent::Spawned(_)));
    }

    #[test]
    fn test_tick_drops_one_row_per_interval() {
        let mut session = playing();
        let y0 = session.active().unwrap().y;
        assert!(!session.tick(999));
        assert!(session.tick(1));
        assert_eq!(session.active().unwrap().y, y0 + 1);
        // A huge frame still moves only one row.
        assert!(session.tick(5000));
        assert_eq!(session.active().unwrap().y, y0 + 2);
    }

    #[test]
    fn test_pause_stops_time_and_resume_resets_timer() {
        let mut session = playing();
        session.tick(900);
        assert!(session.pause());
        assert!(!session.tick(10_000));
        assert_eq!(session.elapsed_ms(), 900);
        assert!(session.resume());
        assert_eq!(session.drop_timer_ms(), 0);
        let y = session.active().unwrap().y;
        assert!(!session.tick(500));
        assert_eq!(session.active().unwrap().y, y);
    }

    #[test]
    fn test_input_ignored_unless_playing() {
        let mut session = GameSession::default();
        assert!(!session.move_left());
        assert!(!session.hard_drop());
        session.start();
        session.pause();
        assert!(!session.rotate());
        assert!(!session.soft_drop());
    }

    #[test]
    fn test_hard_drop_locks_and_respawns() {
        let mut session = playing();
        session.drain_events().for_each(drop);
        assert!(session.hard_drop());
        assert_eq!(session.board().filled_count(), 4);
        let events: Vec<_> = session.drain_events().collect();
        assert!(matches!(events[0], SessionEvent::Locked(LockEvent { lines_cleared: 0, .. })));
        assert!(matches!(events[1], SessionEvent::Spawned(_)));
    }

    #[test]
    fn test_blocked_spawn_costs_life_and_wipes() {
        let mut session = playing();
        block_spawn(&mut session);
        session.hard_drop();
        assert_eq!(session.lives(), 2);
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.board().filled_count(), 0);
        assert!(session.active().is_some());
        assert!(session
            .drain_events()
            .any(|e| e == SessionEvent::LifeLost { lives_left: 2 }));
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut session = GameSession::new(GameConfig {
            lives: 1,
            ..GameConfig::default()
        });
        session.start();
        block_spawn(&mut session);
        session.hard_drop();
        assert_eq!(session.lives(), 0);
        assert_eq!(session.phase(), SessionPhase::GameOver);
        assert!(session.active().is_none());
        assert_eq!(session.final_score(), Some(0));
        assert_eq!(session.final_time().as_deref(), Some("00:00"));
    }

    #[test]
    fn test_discard_policy_keeps_board() {
        let mut session = GameSession::new(GameConfig {
            life_loss: LifeLossPolicy::DiscardPiece,
            ..GameConfig::default()
        });
        session.start();
        block_spawn(&mut session);
        session.hard_drop();
        // The board is kept, so the next piece is blocked as well.
        assert_eq!(session.lives(), 2);
        assert_eq!(session.phase(), SessionPhase::GameOver);
        assert!(session.board().filled_count() > 0);
    }

    #[test]
    fn test_restart_rules() {
        let mut session = playing();
        assert!(!session.restart());
        session.pause();
        assert!(!session.restart());
        assert!(session.quit());
        assert_eq!(session.phase(), SessionPhase::Start);
        assert!(session.restart());
        assert_eq!(session.episode_id(), 2);
        assert_eq!(session.lives(), 3);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_start_level_sets_speed() {
        let session = GameSession::new(GameConfig {
            start_level: 5,
            ..GameConfig::default()
        });
        assert_eq!(session.level(), 5);
        assert_eq!(session.drop_interval_ms(), 600);
        let session = GameSession::new(GameConfig {
            start_level: MAX_LEVEL + 3,
            ..GameConfig::default()
        });
        assert_eq!(session.level(), MAX_LEVEL);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(61_999), "01:01");
        assert_eq!(format_time(3_600_000), "60:00");
    }

    #[test]
    fn test_next_piece_advice_only_while_playing() {
        let mut session = GameSession::default();
        assert!(!session.apply_advice(Advice::NextPiece(PieceKind::I)));
        session.start();
        assert!(session.apply_advice(Advice::NextPiece(PieceKind::I)));
        assert_eq!(session.next_piece(), PieceKind::I);
    }

    #[test]
    fn test_next_piece_advice_ignored_with_seven_bag() {
        let mut session = GameSession::new(GameConfig {
            randomizer: Randomizer::SevenBag,
            ..GameConfig::default()
        });
        session.start();
        let next = session.next_piece();
        let other = PieceKind::ALL.into_iter().find(|&k| k != next).unwrap();
        assert!(!session.apply_advice(Advice::NextPiece(other)));
        assert_eq!(session.next_piece(), next);
    }

    #[test]
    fn test_score_advice_never_changes_score() {
        let mut session = playing();
        session.apply_advice(Advice::ScoreCheck {
            lines: 4,
            level: 1,
            delta: 99_999,
        });
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_render_sink_sees_changes() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let frames = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&frames);
        let mut session = GameSession::default();
        session.set_render_sink(Box::new(move |frame: &Frame<'_>| -> Result<(), SinkError> {
            seen.borrow_mut().push((frame.phase, frame.board_dirty));
            Ok(())
        }));
        session.start();
        session.move_left();

        let frames = frames.borrow();
        assert_eq!(frames.last().map(|f| f.0), Some(SessionPhase::Playing));
        // The board itself did not change on the move.
        assert_eq!(frames.last().map(|f| f.1), Some(false));
        assert!(!session.board().is_dirty());
    }

    #[test]
    fn test_failing_sink_does_not_affect_state() {
        let mut session = GameSession::default();
        session.set_render_sink(Box::new(|_: &Frame<'_>| -> Result<(), SinkError> {
            Err(SinkError::new("gone"))
        }));
        assert!(session.start());
        assert!(session.hard_drop());
        assert_eq!(session.board().filled_count(), 4);
    }

    #[test]
    fn test_snapshot_restores_paused() {
        let mut session = playing();
        session.tick(1000);
        session.move_right();
        let snap = session.snapshot();

        let restored = GameSession::from_snapshot(&snap, GameConfig::default()).unwrap();
        assert_eq!(restored.phase(), SessionPhase::Paused);
        assert_eq!(restored.active(), session.active());
        assert_eq!(restored.next_piece(), session.next_piece());
        assert_eq!(restored.elapsed_ms(), 1000);
    }

    #[test]
    fn test_restore_or_new_falls_back() {
        let mut snap = playing().snapshot();
        snap.board.truncate(5);
        let session = GameSession::restore_or_new(Some(&snap), GameConfig::default());
        assert_eq!(session.phase(), SessionPhase::Start);
    }
}
