//! Background worker.
//!
//! Runs score and next-piece computations on a tokio runtime owned by the
//! worker, and bridges back into the sync game loop through channels the loop
//! polls with `try_recv`. Nothing here is authoritative: if the worker is slow,
//! full or gone, the game carries on with its own results.

use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::{line_clear_points, Advice, ScoreTable, SimpleRng};
use crate::types::{PieceKind, MAX_LEVEL};

/// Requests beyond this many in flight are dropped
const MAX_PENDING: usize = 32;

/// Work handed to the background worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerRequest {
    CalculateScore { lines: u32, level: u32 },
    GenerateNextPiece,
    /// Score check plus a next-piece suggestion in one round trip
    Optimize { lines: u32, level: u32 },
}

/// Worker answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerResponse {
    Score { lines: u32, level: u32, delta: u32 },
    NextPiece(PieceKind),
    Optimized {
        lines: u32,
        level: u32,
        delta: u32,
        next: PieceKind,
    },
    /// Optimization is not attempted on the last level
    Skipped { level: u32 },
}

impl WorkerResponse {
    /// What this answer suggests to the session
    pub fn advice(&self) -> [Option<Advice>; 2] {
        match *self {
            WorkerResponse::Score {
                lines,
                level,
                delta,
            } => [Some(Advice::ScoreCheck { lines, level, delta }), None],
            WorkerResponse::NextPiece(kind) => [Some(Advice::NextPiece(kind)), None],
            WorkerResponse::Optimized {
                lines,
                level,
                delta,
                next,
            } => [
                Some(Advice::ScoreCheck { lines, level, delta }),
                Some(Advice::NextPiece(next)),
            ],
            WorkerResponse::Skipped { .. } => [None, None],
        }
    }
}

/// Compute one answer
pub fn answer(rng: &mut SimpleRng, table: ScoreTable, request: WorkerRequest) -> WorkerResponse {
    match request {
        WorkerRequest::CalculateScore { lines, level } => WorkerResponse::Score {
            lines,
            level,
            delta: line_clear_points(table, lines, level),
        },
        WorkerRequest::GenerateNextPiece => WorkerResponse::NextPiece(rng.next_piece()),
        WorkerRequest::Optimize { level, .. } if level >= MAX_LEVEL => {
            WorkerResponse::Skipped { level }
        }
        WorkerRequest::Optimize { lines, level } => WorkerResponse::Optimized {
            lines,
            level,
            delta: line_clear_points(table, lines, level),
            next: rng.next_piece(),
        },
    }
}

async fn serve(
    mut requests: mpsc::Receiver<WorkerRequest>,
    responses: mpsc::UnboundedSender<WorkerResponse>,
    table: ScoreTable,
    seed: u32,
) {
    let mut rng = SimpleRng::new(seed);
    while let Some(request) = requests.recv().await {
        let response = answer(&mut rng, table, request);
        if responses.send(response).is_err() {
            break;
        }
    }
    debug!("worker stopped");
}

/// Running worker instance
pub struct Worker {
    _rt: Runtime,
    req_tx: mpsc::Sender<WorkerRequest>,
    resp_rx: mpsc::UnboundedReceiver<WorkerResponse>,
}

impl Worker {
    /// Spawn the worker on a fresh runtime
    pub fn start(table: ScoreTable, seed: u32) -> std::io::Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<WorkerRequest>(MAX_PENDING);
        let (resp_tx, resp_rx) = mpsc::unbounded_channel::<WorkerResponse>();

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("tetromino-worker")
            .enable_all()
            .build()?;
        rt.spawn(serve(req_rx, resp_tx, table, seed));

        Ok(Self {
            _rt: rt,
            req_tx,
            resp_rx,
        })
    }

    /// Queue a request; returns false if it was dropped
    pub fn submit(&self, request: WorkerRequest) -> bool {
        match self.req_tx.try_send(request) {
            Ok(()) => true,
            Err(err) => {
                debug!(?request, error = %err, "worker request dropped");
                false
            }
        }
    }

    pub fn try_recv(&mut self) -> Option<WorkerResponse> {
        self.resp_rx.try_recv().ok()
    }
}
