//! Asynchronous search coordination
//!
//! The [`Coordinator`] owns a dedicated worker thread that runs an
//! [`AIEngine`]. Callers hand it a grid snapshot and get back a request id;
//! events for that request then arrive in order: one `Started`, zero or more
//! `Progress`, exactly one `Finished`. A cancelled request produces nothing
//! further for the caller.
//!
//! ```no_run
//! use gomoku::{Coordinator, Difficulty, EngineConfig, Grid, Side};
//!
//! let mut coordinator = Coordinator::spawn(EngineConfig::default())?;
//! let grid = Grid::new(15)?;
//! coordinator.search(&grid, Side::Black, Difficulty::Medium, 0)?;
//! let result = coordinator.wait(|p| println!("depth {} nodes {}", p.depth, p.nodes))?;
//! println!("{:?}", result.best_move);
//! # Ok::<(), gomoku::EngineError>(())
//! ```

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, warn};

use crate::board::{Grid, Side};
use crate::config::{Difficulty, EngineConfig};
use crate::engine::AIEngine;
use crate::error::{EngineError, Result};
use crate::search::{SearchProgress, SearchResult};

/// Event stream of one search request
#[derive(Debug)]
pub enum SearchEvent {
    /// The worker picked the request up
    Started { request_id: u64 },
    /// Best-effort telemetry while searching
    Progress {
        request_id: u64,
        progress: SearchProgress,
    },
    /// Terminal outcome
    Finished {
        request_id: u64,
        outcome: Result<SearchResult>,
    },
}

impl SearchEvent {
    pub fn request_id(&self) -> u64 {
        match self {
            SearchEvent::Started { request_id }
            | SearchEvent::Progress { request_id, .. }
            | SearchEvent::Finished { request_id, .. } => *request_id,
        }
    }
}

struct SearchRequest {
    id: u64,
    grid: Grid,
    side: Side,
    difficulty: Difficulty,
    move_count: usize,
    abort: Arc<AtomicBool>,
    events: Sender<SearchEvent>,
}

enum Command {
    Search(SearchRequest),
    Shutdown,
}

/// The single request in flight
struct ActiveSearch {
    id: u64,
    abort: Arc<AtomicBool>,
    events: Receiver<SearchEvent>,
}

/// Runs searches on a worker thread, one at a time.
pub struct Coordinator {
    commands: Sender<Command>,
    worker: Option<JoinHandle<()>>,
    active: Option<ActiveSearch>,
    next_id: u64,
}

impl Coordinator {
    /// Start the worker thread.
    ///
    /// The engine is built on the worker. If that fails (for instance an
    /// unsupported board size), spawning still succeeds and every request
    /// finishes with [`EngineError::Initialization`].
    pub fn spawn(config: EngineConfig) -> Result<Self> {
        let (commands, inbox) = unbounded();
        let worker = thread::Builder::new()
            .name("gomoku-search".to_string())
            .spawn(move || worker_loop(config, inbox))?;

        Ok(Self {
            commands,
            worker: Some(worker),
            active: None,
            next_id: 1,
        })
    }

    /// Submit a search and return its request id.
    ///
    /// Fails fast with [`EngineError::SearchInProgress`] if a search is
    /// already pending; requests are never queued.
    pub fn search(
        &mut self,
        grid: &Grid,
        side: Side,
        difficulty: Difficulty,
        move_count: usize,
    ) -> Result<u64> {
        if let Some(active) = &self.active {
            warn!(pending = active.id, "rejected search request: another search is in progress");
            return Err(EngineError::SearchInProgress);
        }

        let id = self.next_id;
        self.next_id += 1;

        let (events, receiver) = unbounded();
        let abort = Arc::new(AtomicBool::new(false));
        let request = SearchRequest {
            id,
            grid: grid.clone(),
            side,
            difficulty,
            move_count,
            abort: Arc::clone(&abort),
            events,
        };
        self.commands
            .send(Command::Search(request))
            .map_err(|_| EngineError::WorkerDisconnected)?;

        debug!(request_id = id, %side, %difficulty, move_count, "search submitted");
        self.active = Some(ActiveSearch {
            id,
            abort,
            events: receiver,
        });
        Ok(id)
    }

    pub fn is_searching(&self) -> bool {
        self.active.is_some()
    }

    /// Id of the pending request, if any
    pub fn active_request(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Next event of the pending search, without blocking.
    ///
    /// A `Finished` event clears the pending search.
    pub fn poll(&mut self) -> Option<SearchEvent> {
        let active = self.active.as_ref()?;
        match active.events.try_recv() {
            Ok(event) => {
                if matches!(event, SearchEvent::Finished { .. }) {
                    self.active = None;
                }
                Some(event)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                let request_id = active.id;
                self.active = None;
                Some(SearchEvent::Finished {
                    request_id,
                    outcome: Err(EngineError::WorkerDisconnected),
                })
            }
        }
    }

    /// Block until the pending search finishes, forwarding progress.
    pub fn wait(&mut self, mut on_progress: impl FnMut(SearchProgress)) -> Result<SearchResult> {
        let active = self.active.take().ok_or(EngineError::NoSearchPending)?;
        loop {
            match active.events.recv() {
                Ok(SearchEvent::Started { .. }) => {}
                Ok(SearchEvent::Progress { progress, .. }) => on_progress(progress),
                Ok(SearchEvent::Finished { outcome, .. }) => return outcome,
                Err(_) => return Err(EngineError::WorkerDisconnected),
            }
        }
    }

    /// Like [`Self::wait`] but gives up after `timeout`.
    ///
    /// Returns `Ok(None)` on timeout; the search stays pending.
    pub fn wait_timeout(
        &mut self,
        timeout: Duration,
        mut on_progress: impl FnMut(SearchProgress),
    ) -> Result<Option<SearchResult>> {
        let deadline = Instant::now() + timeout;
        loop {
            let active = self.active.as_ref().ok_or(EngineError::NoSearchPending)?;
            match active.events.recv_deadline(deadline) {
                Ok(SearchEvent::Started { .. }) => {}
                Ok(SearchEvent::Progress { progress, .. }) => on_progress(progress),
                Ok(SearchEvent::Finished { outcome, .. }) => {
                    self.active = None;
                    return outcome.map(Some);
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => {
                    self.active = None;
                    return Err(EngineError::WorkerDisconnected);
                }
            }
        }
    }

    /// Cancel the pending search.
    ///
    /// Sets its abort flag and drops the event stream, so no late result can
    /// reach the caller. Returns `false` when nothing was pending.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.abort.store(true, Ordering::Relaxed);
                debug!(request_id = active.id, "search cancelled");
                true
            }
            None => false,
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.cancel();
        let _ = self.commands.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("search worker panicked during shutdown");
            }
        }
    }
}

fn worker_loop(config: EngineConfig, inbox: Receiver<Command>) {
    let mut engine = AIEngine::new(config).map_err(|e| {
        warn!(error = %e, "search engine failed to initialize");
        e.to_string()
    });

    for command in inbox {
        match command {
            Command::Search(request) => run_request(&mut engine, request),
            Command::Shutdown => break,
        }
    }
    debug!("search worker stopped");
}

fn run_request(engine: &mut std::result::Result<AIEngine, String>, request: SearchRequest) {
    let SearchRequest {
        id,
        grid,
        side,
        difficulty,
        move_count,
        abort,
        events,
    } = request;

    // Sends fail only once the caller cancelled; nothing to do then
    let _ = events.send(SearchEvent::Started { request_id: id });

    let outcome = match engine {
        Err(reason) => Err(EngineError::Initialization {
            reason: reason.clone(),
        }),
        Ok(engine) => {
            let progress_events = events.clone();
            let mut forward = |progress: SearchProgress| {
                let _ = progress_events.send(SearchEvent::Progress {
                    request_id: id,
                    progress,
                });
            };
            let result = catch_unwind(AssertUnwindSafe(|| {
                engine.get_move_with(&grid, side, difficulty, move_count, &abort, &mut forward)
            }));
            result.unwrap_or_else(|payload| {
                let reason = panic_message(payload.as_ref());
                warn!(request_id = id, %reason, "search panicked");
                // The table may hold half-written state
                engine.clear_cache();
                Err(EngineError::SearchPanicked { reason })
            })
        }
    };

    if abort.load(Ordering::Relaxed) {
        debug!(request_id = id, "dropping result of cancelled search");
        return;
    }
    if let Err(e) = &outcome {
        warn!(request_id = id, error = %e, "search failed");
    }
    let _ = events.send(SearchEvent::Finished {
        request_id: id,
        outcome,
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
