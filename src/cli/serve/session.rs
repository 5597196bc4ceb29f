//! State the dev server carries across rebuilds.
//!
//! ```text
//! Idle ──▶ Building ──▶ Serving ──(change)──▶ Building ──▶ Serving ...
//!              │                                  │
//!              └─(failed, no good output)─▶ Idle  └─(failed)─▶ Serving (last good)
//!
//! any state ──(Ctrl+C, watcher failure)──▶ Stopped
//! ```
//!
//! A failed rebuild never replaces the last good output; it only records
//! the error so new clients and HTML requests can show it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use parking_lot::{Condvar, Mutex};

use crate::asset::BuildOutput;
use crate::config::PipelineConfig;
use crate::pipeline::{self, BuildError};

/// Lifecycle of the dev server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// No successful build yet.
    Idle,
    Building,
    /// A good output is available.
    Serving,
    /// Terminal.
    Stopped,
}

/// A failed build, as reported to the terminal and to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFailure {
    /// Root-relative file the error points at, empty when unknown.
    pub path: String,
    pub message: String,
}

impl BuildFailure {
    fn from_error(err: &BuildError, config: &PipelineConfig) -> Self {
        let path = err
            .path()
            .map(|p| config.root_relative(p).display().to_string())
            .unwrap_or_default();
        Self {
            path,
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}\n{}", self.path, self.message)
        }
    }
}

/// Result of one [`DevServerSession::rebuild`].
#[derive(Debug)]
pub enum RebuildOutcome {
    Built {
        output: Arc<BuildOutput>,
        elapsed: Duration,
    },
    Failed(BuildFailure),
    /// The session was already stopped; nothing ran.
    Skipped,
}

/// Last good output, last error and lifecycle state of one `serve` run.
pub struct DevServerSession {
    output: ArcSwapOption<BuildOutput>,
    last_error: Mutex<Option<BuildFailure>>,
    state: Mutex<ServerState>,
    settled: Condvar,
    clients: AtomicUsize,
    ws_port: AtomicU16,
    /// Serve the last good output while `Building` instead of waiting.
    stale: bool,
}

impl DevServerSession {
    pub fn new(stale: bool) -> Self {
        Self {
            output: ArcSwapOption::empty(),
            last_error: Mutex::new(None),
            state: Mutex::new(ServerState::Idle),
            settled: Condvar::new(),
            clients: AtomicUsize::new(0),
            ws_port: AtomicU16::new(0),
            stale,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ServerState {
        *self.state.lock()
    }

    /// Run one build and fold its result into the session.
    pub fn rebuild(&self, config: &PipelineConfig) -> RebuildOutcome {
        if !self.begin_build() {
            return RebuildOutcome::Skipped;
        }

        let started = Instant::now();
        let result = pipeline::build(config, config.build_mode());

        match result {
            Ok(output) => {
                let output = Arc::new(output);
                self.output.store(Some(Arc::clone(&output)));
                *self.last_error.lock() = None;
                self.settle(ServerState::Serving);
                RebuildOutcome::Built {
                    output,
                    elapsed: started.elapsed(),
                }
            }
            Err(err) => {
                let failure = BuildFailure::from_error(&err, config);
                *self.last_error.lock() = Some(failure.clone());
                let next = if self.last_output().is_some() {
                    ServerState::Serving
                } else {
                    ServerState::Idle
                };
                self.settle(next);
                RebuildOutcome::Failed(failure)
            }
        }
    }

    fn begin_build(&self) -> bool {
        let mut state = self.state.lock();
        if *state == ServerState::Stopped {
            return false;
        }
        *state = ServerState::Building;
        true
    }

    /// Leave `Building` unless the session was stopped meanwhile.
    fn settle(&self, next: ServerState) {
        let mut state = self.state.lock();
        if *state != ServerState::Stopped {
            *state = next;
        }
        self.settled.notify_all();
    }

    /// Enter the terminal state and release waiting requests.
    pub fn stop(&self) {
        *self.state.lock() = ServerState::Stopped;
        self.settled.notify_all();
    }

    /// Output a request should be answered from.
    ///
    /// With `stale = false` this blocks while a build is running.
    pub fn output_for_request(&self) -> Option<Arc<BuildOutput>> {
        if !self.stale {
            let mut state = self.state.lock();
            while *state == ServerState::Building {
                self.settled.wait(&mut state);
            }
        }
        self.output.load_full()
    }

    pub fn last_output(&self) -> Option<Arc<BuildOutput>> {
        self.output.load_full()
    }

    pub fn last_error(&self) -> Option<BuildFailure> {
        self.last_error.lock().clone()
    }

    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }

    pub fn set_client_count(&self, count: usize) {
        self.clients.store(count, Ordering::Relaxed);
    }

    /// Bound WebSocket port, `None` without hot reload.
    pub fn ws_port(&self) -> Option<u16> {
        match self.ws_port.load(Ordering::Relaxed) {
            0 => None,
            port => Some(port),
        }
    }

    pub fn set_ws_port(&self, port: u16) {
        self.ws_port.store(port, Ordering::Relaxed);
    }
}
