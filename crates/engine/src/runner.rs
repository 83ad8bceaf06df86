//! Frame runner - the cooperative fall loop.
//!
//! The host calls [`Runner::advance`] with its monotonic clock as often as it
//! likes. The runner keeps at most one scheduled frame, tagged with the
//! session episode it was scheduled for, and runs it once due: one
//! `GameSession::tick` per frame. Pausing or finishing drops the schedule;
//! restarting drops it before the session is reinitialized, and a frame
//! scheduled for an older episode is discarded rather than run.

use tracing::debug;

use crate::core::{GameSession, SessionEvent};
use crate::types::{GameAction, SessionPhase, TICK_MS};
use crate::worker::{Worker, WorkerRequest};

/// The one pending frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTick {
    pub episode: u32,
    pub due_ms: u64,
}

pub struct Runner {
    session: GameSession,
    worker: Option<Worker>,
    scheduled: Option<ScheduledTick>,
    last_frame_ms: u64,
    events: Vec<SessionEvent>,
}

impl Runner {
    pub fn new(session: GameSession, worker: Option<Worker>) -> Self {
        Self {
            session,
            worker,
            scheduled: None,
            last_frame_ms: 0,
            events: Vec::new(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn scheduled(&self) -> Option<ScheduledTick> {
        self.scheduled
    }

    /// Bring the loop up to `now_ms`; returns true if a frame changed the game
    pub fn advance(&mut self, now_ms: u64) -> bool {
        self.poll_worker();

        if self.session.phase() != SessionPhase::Playing {
            self.scheduled = None;
            self.collect_events();
            return false;
        }

        let episode = self.session.episode_id();
        let due = match self.scheduled {
            Some(tick) if tick.episode == episode => tick,
            stale => {
                if let Some(tick) = stale {
                    debug!(stale = tick.episode, current = episode, "discarding stale frame");
                }
                self.schedule(episode, now_ms);
                self.collect_events();
                return false;
            }
        };
        if now_ms < due.due_ms {
            return false;
        }

        let elapsed = now_ms.saturating_sub(self.last_frame_ms);
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        let changed = self.session.tick(elapsed);

        if self.session.phase() == SessionPhase::Playing {
            self.schedule(episode, now_ms);
        } else {
            self.scheduled = None;
        }
        self.collect_events();
        changed
    }

    fn schedule(&mut self, episode: u32, now_ms: u64) {
        self.last_frame_ms = now_ms;
        self.scheduled = Some(ScheduledTick {
            episode,
            due_ms: now_ms + u64::from(TICK_MS),
        });
    }

    /// Apply an input command
    pub fn dispatch(&mut self, action: GameAction) -> bool {
        if action == GameAction::Restart {
            // A stale frame must never touch the fresh board.
            self.scheduled = None;
        }
        let changed = self.session.apply_action(action);
        if self.session.phase() != SessionPhase::Playing {
            self.scheduled = None;
        }
        self.collect_events();
        changed
    }

    /// Start from the start screen
    pub fn start(&mut self) -> bool {
        self.scheduled = None;
        let started = self.session.start();
        self.collect_events();
        started
    }

    /// Abandon a paused game
    pub fn quit(&mut self) -> bool {
        let quit = self.session.quit();
        self.scheduled = None;
        self.collect_events();
        quit
    }

    fn poll_worker(&mut self) {
        let Some(worker) = self.worker.as_mut() else {
            return;
        };
        while let Some(response) = worker.try_recv() {
            for advice in response.advice().into_iter().flatten() {
                self.session.apply_advice(advice);
            }
        }
    }

    fn collect_events(&mut self) {
        for event in self.session.drain_events() {
            if let (SessionEvent::Locked(lock), Some(worker)) = (&event, self.worker.as_ref()) {
                worker.submit(WorkerRequest::Optimize {
                    lines: lock.lines_cleared,
                    level: lock.level,
                });
            }
            self.events.push(event);
        }
    }

    /// Events since the last call, oldest first
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}
