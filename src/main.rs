//! Terminal Tetromino (default binary).
//!
//! Drives a [`Runner`] from the crossterm event loop. The session pushes its
//! own frames to the terminal renderer; this loop only feeds it input and the
//! clock, then reacts to the events it reports.
//!
//! Environment:
//!
//! - `TETROMINO_LOG_PATH` / `TETROMINO_LOG`: log file and filter (logging is off without a path)
//! - `TETROMINO_SAVE_PATH`: resume an interrupted game from this file
//! - `TETROMINO_SCORES_PATH`: append high scores to this JSON-lines file
//! - `TETROMINO_PLAYER`: name used for score submissions (falls back to `USER`)
//! - `TETROMINO_WORKER=0`: run without the background worker

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use tetromino::adapter::{
    deliver, is_high_score, restore_session, JsonFileStore, JsonlScoreLog, ScoreSubmission,
    SnapshotStore,
};
use tetromino::core::{FinalResult, GameConfig, GameSession, SessionEvent};
use tetromino::engine::{Runner, Worker};
use tetromino::input::{handle_key_event, should_quit};
use tetromino::term::{GameView, TerminalGuard, TerminalRenderer};
use tetromino::types::{SessionPhase, TICK_MS};

fn main() -> Result<()> {
    init_logging()?;

    let config = GameConfig::from_env();
    let mut store = JsonFileStore::from_env();
    let session = match &store {
        Some(store) => restore_session(store, config.clone()),
        None => GameSession::new(config.clone()),
    };
    let worker = start_worker(&config);
    let mut runner = Runner::new(session, worker);

    let guard = TerminalGuard::enter()?;
    runner
        .session_mut()
        .set_render_sink(Box::new(TerminalRenderer::new(GameView::default())));

    let result = run(&mut runner);

    // Always try to restore terminal state.
    runner.session_mut().take_render_sink();
    if let Err(err) = guard.exit() {
        warn!(error = %format!("{err:#}"), "could not restore terminal");
    }

    if let Some(store) = store.as_mut() {
        persist(store, runner.session());
    }
    result
}

fn init_logging() -> Result<()> {
    let Some(path) = std::env::var("TETROMINO_LOG_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
    else {
        return Ok(());
    };
    // The terminal belongs to the game, so logs only ever go to a file.
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {path}"))?;
    let filter = EnvFilter::try_from_env("TETROMINO_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .init();
    Ok(())
}

fn start_worker(config: &GameConfig) -> Option<Worker> {
    if std::env::var("TETROMINO_WORKER").is_ok_and(|v| v.trim() == "0") {
        return None;
    }
    match Worker::start(config.score_table, config.seed.wrapping_add(1)) {
        Ok(worker) => Some(worker),
        Err(err) => {
            warn!(error = %err, "worker unavailable, continuing without it");
            None
        }
    }
}

fn run(runner: &mut Runner) -> Result<()> {
    let clock = Instant::now();
    let frame = Duration::from_millis(u64::from(TICK_MS));

    loop {
        if event::poll(frame)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        let plain_q = matches!(key.code, KeyCode::Char(_))
                            && !key.modifiers.contains(KeyModifiers::CONTROL);
                        if plain_q && runner.session().phase() == SessionPhase::Paused {
                            runner.quit();
                        } else {
                            return Ok(());
                        }
                    } else if let Some(action) = handle_key_event(key) {
                        runner.dispatch(action);
                    }
                }
                Event::Resize(..) => {
                    // A fresh renderer has no previous frame, so it redraws everything.
                    runner
                        .session_mut()
                        .set_render_sink(Box::new(TerminalRenderer::new(GameView::default())));
                }
                _ => {}
            }
        }

        let now_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        runner.advance(now_ms);

        for event in runner.take_events() {
            match event {
                SessionEvent::GameOver(result) | SessionEvent::Completed(result) => {
                    submit_score(&result);
                }
                SessionEvent::LevelUp { level } => info!(level, "level up"),
                _ => {}
            }
        }
    }
}

fn submit_score(result: &FinalResult) {
    let Some(mut log) = JsonlScoreLog::from_env() else {
        return;
    };
    let entries = match log.entries() {
        Ok(entries) => entries,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "could not read score log");
            return;
        }
    };
    if !is_high_score(result.score, &entries) {
        return;
    }
    let name = std::env::var("TETROMINO_PLAYER")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_default();
    match ScoreSubmission::new(&name, result) {
        Ok(submission) => {
            deliver(&mut log, &submission);
        }
        Err(err) => warn!(error = %err, "score not submitted"),
    }
}

/// Keep an unfinished game for next time; forget a finished one
fn persist(store: &mut JsonFileStore, session: &GameSession) {
    let outcome = match session.phase() {
        SessionPhase::Playing | SessionPhase::Paused => store.save(&session.snapshot()),
        _ => store.clear(),
    };
    if let Err(err) = outcome {
        warn!(error = %format!("{err:#}"), "could not update saved game");
    }
}
