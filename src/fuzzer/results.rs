//! Fuzzing result collection

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::task::{FailureKind, FuzzTask, Outcome};

/// Single fuzzing result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzResult {
    /// Position of the word in the submitted list
    pub index: usize,
    /// Word the URL was built from
    pub word: String,
    /// Candidate URL that was probed
    pub url: String,
    /// Status code or failure
    pub outcome: Outcome,
    /// Time from dispatch to outcome
    pub elapsed: Duration,
}

impl FuzzResult {
    pub fn new(task: FuzzTask, outcome: Outcome, elapsed: Duration) -> Self {
        Self {
            index: task.index,
            word: task.word,
            url: task.url,
            outcome,
            elapsed,
        }
    }

    pub fn is_found(&self) -> bool {
        self.outcome.is_found()
    }
}

/// Ordered collection of results from one run
#[derive(Debug, Clone, Default)]
pub struct FuzzResultSet {
    /// All results, in submission order
    pub results: Vec<FuzzResult>,
    /// Status code distribution
    pub status_distribution: HashMap<u16, usize>,
    /// Failure distribution
    pub failure_distribution: HashMap<FailureKind, usize>,
}

impl FuzzResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result
    pub fn add_result(&mut self, result: FuzzResult) {
        match &result.outcome {
            Outcome::Status(code) => {
                *self.status_distribution.entry(*code).or_insert(0) += 1;
            }
            Outcome::Failed(failure) => {
                *self.failure_distribution.entry(failure.kind).or_insert(0) += 1;
            }
        }
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Results with status 200
    pub fn found(&self) -> Vec<&FuzzResult> {
        self.results.iter().filter(|r| r.is_found()).collect()
    }

    /// Results that never got a status
    pub fn failures(&self) -> Vec<&FuzzResult> {
        self.results.iter().filter(|r| r.outcome.is_failure()).collect()
    }

    /// Get statistics
    pub fn stats(&self) -> FuzzResultStats {
        let total = self.results.len();
        let failed = self.failures().len();
        let found = self.found().len();

        let average_response_time = if total > 0 {
            let total_time: Duration = self.results.iter().map(|r| r.elapsed).sum();
            total_time / total as u32
        } else {
            Duration::ZERO
        };

        FuzzResultStats {
            total_requests: total,
            found_count: found,
            failed_count: failed,
            average_response_time,
            status_distribution: self.status_distribution.clone(),
        }
    }
}

/// Statistics from fuzzing results
#[derive(Debug, Clone)]
pub struct FuzzResultStats {
    pub total_requests: usize,
    pub found_count: usize,
    pub failed_count: usize,
    pub average_response_time: Duration,
    pub status_distribution: HashMap<u16, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, word: &str, outcome: Outcome) -> FuzzResult {
        FuzzResult::new(
            FuzzTask::new(index, "http://t", word),
            outcome,
            Duration::from_millis(10),
        )
    }

    #[test]
    fn test_distribution_and_stats() {
        let mut set = FuzzResultSet::new();
        set.add_result(result(0, "a", Outcome::Status(200)));
        set.add_result(result(1, "b", Outcome::Status(404)));
        set.add_result(result(2, "c", Outcome::Status(404)));
        set.add_result(result(3, "d", Outcome::cancelled()));

        assert_eq!(set.len(), 4);
        assert_eq!(set.status_distribution.get(&404), Some(&2));
        assert_eq!(set.failure_distribution.get(&FailureKind::Cancelled), Some(&1));

        let stats = set.stats();
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.found_count, 1);
        assert_eq!(stats.failed_count, 1);
        assert_eq!(stats.average_response_time, Duration::from_millis(10));
    }

    #[test]
    fn test_found_keeps_order() {
        let mut set = FuzzResultSet::new();
        set.add_result(result(0, "z", Outcome::Status(200)));
        set.add_result(result(1, "m", Outcome::Status(500)));
        set.add_result(result(2, "a", Outcome::Status(200)));

        let words: Vec<&str> = set.found().iter().map(|r| r.word.as_str()).collect();
        assert_eq!(words, vec!["z", "a"]);
    }

    #[test]
    fn test_empty_stats() {
        let stats = FuzzResultSet::new().stats();
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.average_response_time, Duration::ZERO);
    }
}
