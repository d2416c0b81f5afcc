//! Fuzzer module - concurrent content discovery
//!
//! Builds a candidate URL for every wordlist entry, probes them all
//! concurrently and hands back the outcomes in wordlist order.

mod engine;
mod results;
mod task;
mod wordlist;

pub use engine::{Fuzzer, FuzzerConfig, FuzzerState};
pub use results::{FuzzResult, FuzzResultSet};
pub use wordlist::{Wordlist, WordlistOptions};

#[cfg(test)]
pub(crate) use task::{FuzzTask, Outcome};

/// Fuzzer statistics
#[derive(Debug, Clone, Default)]
pub struct FuzzerStats {
    /// Probes finished, whatever their outcome
    pub requests_sent: usize,
    /// Probes not yet finished
    pub requests_remaining: usize,
    /// Requests per second
    pub requests_per_second: f64,
    /// Probes that ended without a status
    pub errors: usize,
    /// Probes that answered 200
    pub found_count: usize,
    /// Start time
    pub start_time: Option<std::time::Instant>,
    /// Elapsed time in milliseconds
    pub elapsed_ms: u64,
}

impl FuzzerStats {
    /// Account for one finished probe
    pub fn record(&mut self, result: &FuzzResult) {
        self.requests_sent += 1;
        self.requests_remaining = self.requests_remaining.saturating_sub(1);

        if result.outcome.is_failure() {
            self.errors += 1;
        } else if result.is_found() {
            self.found_count += 1;
        }

        if let Some(start_time) = self.start_time {
            self.elapsed_ms = start_time.elapsed().as_millis() as u64;
            if self.elapsed_ms > 0 {
                self.requests_per_second =
                    self.requests_sent as f64 / (self.elapsed_ms as f64 / 1000.0);
            }
        }
    }
}
