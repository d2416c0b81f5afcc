//! Core fuzzer engine with concurrent request handling

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

use super::results::{FuzzResult, FuzzResultSet};
use super::task::{FuzzTask, Outcome};
use super::FuzzerStats;
use crate::error::FuzzerError;
use crate::http::{Method, Transport};
use crate::reporting::Console;

/// Fuzzer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzerState {
    Idle,
    Running,
    Stopped,
    Completed,
}

/// Fuzzer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzerConfig {
    /// Maximum concurrent requests, 0 for no limit
    pub max_concurrent: usize,
    /// Print a `Fuzzing: <url>` line as each probe starts
    pub show_progress: bool,
    /// Verb every request is sent with
    pub method: Method,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 50,
            show_progress: true,
            method: Method::Get,
        }
    }
}

/// A dispatched or skipped probe awaiting collection
struct Pending {
    task: FuzzTask,
    handle: Option<JoinHandle<FuzzResult>>,
}

/// Clears the running flag when a run ends, however it ends
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Concurrent probe dispatcher
pub struct Fuzzer {
    /// Configuration
    config: FuzzerConfig,
    /// Shared, read-only transport
    transport: Arc<dyn Transport>,
    /// Progress sink
    console: Console,
    /// Current state
    state: Arc<RwLock<FuzzerState>>,
    /// Statistics
    stats: Arc<RwLock<FuzzerStats>>,
    /// Raised by `stop`, never lowered
    cancel: watch::Sender<bool>,
    /// Held by the `fuzz` call in progress, until its last result is collected
    running: AtomicBool,
}

impl Fuzzer {
    /// Create a new fuzzer
    pub fn new(config: FuzzerConfig, transport: Arc<dyn Transport>, console: Console) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            config,
            transport,
            console,
            state: Arc::new(RwLock::new(FuzzerState::Idle)),
            stats: Arc::new(RwLock::new(FuzzerStats::default())),
            cancel,
            running: AtomicBool::new(false),
        }
    }

    /// Probe every word against `base_url`
    ///
    /// Returns one result per word, in the order the words were given, once
    /// every probe has finished. Transport failures and cancellation become
    /// failure outcomes; they never cut the result set short. On a stopped
    /// engine nothing is sent and every word comes back cancelled.
    pub async fn fuzz(&self, base_url: &str, words: &[String]) -> Result<FuzzResultSet, FuzzerError> {
        if base_url.trim().is_empty() {
            return Err(FuzzerError::EmptyBaseUrl);
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FuzzerError::AlreadyRunning);
        }
        let _running = RunGuard(&self.running);

        {
            let mut state = self.state.write();
            if self.is_cancelled() {
                tracing::warn!("Stop already requested, no probe will be sent");
            } else {
                *state = FuzzerState::Running;
            }
        }

        {
            let mut stats = self.stats.write();
            *stats = FuzzerStats::default();
            stats.requests_remaining = words.len();
            stats.start_time = Some(Instant::now());
        }

        tracing::info!(
            base_url,
            words = words.len(),
            max_concurrent = self.config.max_concurrent,
            method = %self.config.method,
            "Starting dispatch"
        );

        let semaphore = (self.config.max_concurrent > 0)
            .then(|| Arc::new(Semaphore::new(self.config.max_concurrent)));

        let mut pending = Vec::with_capacity(words.len());

        for (index, word) in words.iter().enumerate() {
            let task = FuzzTask::new(index, base_url, word);

            if self.is_cancelled() {
                pending.push(Pending { task, handle: None });
                continue;
            }

            let permit = match &semaphore {
                Some(semaphore) => match self.acquire_permit(semaphore).await {
                    Some(permit) => Some(permit),
                    None => {
                        pending.push(Pending { task, handle: None });
                        continue;
                    }
                },
                None => None,
            };

            let handle = self.spawn_probe(task.clone(), permit);
            pending.push(Pending {
                task,
                handle: Some(handle),
            });
        }

        // Barrier: collect in submission order regardless of completion order
        let mut results = FuzzResultSet::new();
        for Pending { task, handle } in pending {
            let result = match handle {
                Some(handle) => match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::error!(url = %task.url, "Probe task failed: {}", e);
                        self.record(FuzzResult::new(task, Outcome::internal(e.to_string()), Duration::ZERO))
                    }
                },
                None => self.record(FuzzResult::new(task, Outcome::cancelled(), Duration::ZERO)),
            };
            results.add_result(result);
        }

        {
            let mut state = self.state.write();
            if *state == FuzzerState::Running {
                *state = FuzzerState::Completed;
            }
        }

        let stats = self.stats();
        tracing::info!(
            results = results.len(),
            sent = stats.requests_sent,
            errors = stats.errors,
            found = stats.found_count,
            requests_per_second = stats.requests_per_second,
            elapsed_ms = stats.elapsed_ms,
            "Dispatch finished"
        );
        Ok(results)
    }

    /// Launch one probe as its own task
    fn spawn_probe(
        &self,
        task: FuzzTask,
        permit: Option<OwnedSemaphorePermit>,
    ) -> JoinHandle<FuzzResult> {
        let transport = self.transport.clone();
        let console = self.console.clone();
        let stats = self.stats.clone();
        let mut cancel = self.cancel.subscribe();
        let show_progress = self.config.show_progress;
        let method = self.config.method;

        tokio::spawn(async move {
            let _permit = permit;

            if show_progress {
                console.line(format!("Fuzzing: {}", task.url));
            }

            let start = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = cancel.wait_for(|stopped| *stopped) => Outcome::cancelled(),
                outcome = task.probe(transport.as_ref(), method) => outcome,
            };

            let result = FuzzResult::new(task, outcome, start.elapsed());
            stats.write().record(&result);
            result
        })
    }

    /// Wait for a concurrency slot, giving up if the run is stopped
    async fn acquire_permit(&self, semaphore: &Arc<Semaphore>) -> Option<OwnedSemaphorePermit> {
        let mut cancel = self.cancel.subscribe();
        tokio::select! {
            biased;
            _ = cancel.wait_for(|stopped| *stopped) => None,
            permit = semaphore.clone().acquire_owned() => permit.ok(),
        }
    }

    fn record(&self, result: FuzzResult) -> FuzzResult {
        self.stats.write().record(&result);
        result
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Stop the engine
    ///
    /// In-flight probes are abandoned and words not yet dispatched are
    /// skipped; both are reported as cancelled. The stop is permanent: a
    /// request made before `fuzz` starts, or between runs, cancels every
    /// word of the next run.
    pub fn stop(&self) {
        self.cancel.send_replace(true);
        *self.state.write() = FuzzerState::Stopped;
    }

    /// Get current state
    pub fn state(&self) -> FuzzerState {
        *self.state.read()
    }

    /// Get current stats
    pub fn stats(&self) -> FuzzerStats {
        self.stats.read().clone()
    }
}
