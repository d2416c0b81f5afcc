//! Result reporting
//!
//! Turns a finished run into console output:
//! - `Found` lines for every exact 200, as text or JSON
//! - a completion line with a short summary

pub mod console;
pub mod formats;

pub use console::Console;

use serde::{Deserialize, Serialize};

use crate::fuzzer::{FuzzResult, FuzzResultSet};

/// A reported discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub status: u16,
    pub url: String,
    pub word: String,
}

impl Finding {
    /// Build a finding from a result, if the result is one
    pub fn from_result(result: &FuzzResult) -> Option<Self> {
        if !result.is_found() {
            return None;
        }
        Some(Self {
            status: result.outcome.status()?,
            url: result.url.clone(),
            word: result.word.clone(),
        })
    }
}

/// Finding line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Writes findings to the console
pub struct Reporter {
    console: Console,
    format: OutputFormat,
}

impl Reporter {
    pub fn new(console: Console, format: OutputFormat) -> Self {
        Self { console, format }
    }

    /// Emit one line per finding, in submission order
    ///
    /// Returns the findings that were written.
    pub fn report(&self, results: &FuzzResultSet) -> Vec<Finding> {
        let findings: Vec<Finding> = results
            .results
            .iter()
            .filter_map(Finding::from_result)
            .collect();

        for finding in &findings {
            match self.format {
                OutputFormat::Text => self.console.line(formats::text::generate(finding)),
                OutputFormat::Json => match formats::json::generate(finding) {
                    Ok(line) => self.console.line(line),
                    Err(e) => tracing::error!(url = %finding.url, "Failed to encode finding: {}", e),
                },
            }
        }

        findings
    }

    /// Completion line and totals
    pub fn complete(&self, results: &FuzzResultSet) {
        let stats = results.stats();
        self.console.line("Fuzzing complete!");
        self.console.line(format!(
            "{} requests, {} found, {} failed",
            stats.total_requests, stats.found_count, stats.failed_count
        ));

        tracing::info!(
            total = stats.total_requests,
            found = stats.found_count,
            failed = stats.failed_count,
            avg_ms = stats.average_response_time.as_millis() as u64,
            "Run complete"
        );
        tracing::debug!(
            statuses = ?stats.status_distribution,
            failures = ?results.failure_distribution,
            "Outcome distribution"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzer::{FuzzTask, Outcome};
    use std::time::Duration;

    fn result_set(outcomes: &[(&str, Outcome)]) -> FuzzResultSet {
        let mut set = FuzzResultSet::new();
        for (index, (word, outcome)) in outcomes.iter().enumerate() {
            set.add_result(FuzzResult::new(
                FuzzTask::new(index, "http://example.com", word),
                outcome.clone(),
                Duration::ZERO,
            ));
        }
        set
    }

    #[test]
    fn test_only_200_is_reported() {
        let (console, buffer) = Console::capture();
        let reporter = Reporter::new(console, OutputFormat::Text);

        let set = result_set(&[
            ("missing", Outcome::Status(404)),
            ("found", Outcome::Status(200)),
            ("created", Outcome::Status(201)),
            ("broken", Outcome::Status(500)),
            ("slow", Outcome::cancelled()),
        ]);

        let findings = reporter.report(&set);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].word, "found");
        assert_eq!(buffer.lines(), vec!["Found: 200 http://example.com/found"]);
    }

    #[test]
    fn test_json_format() {
        let (console, buffer) = Console::capture();
        let reporter = Reporter::new(console, OutputFormat::Json);

        reporter.report(&result_set(&[("admin", Outcome::Status(200))]));

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        let finding: Finding = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(finding.url, "http://example.com/admin");
    }

    #[test]
    fn test_completion_summary() {
        let (console, buffer) = Console::capture();
        let reporter = Reporter::new(console, OutputFormat::Text);

        reporter.complete(&result_set(&[
            ("a", Outcome::Status(200)),
            ("b", Outcome::Status(404)),
            ("c", Outcome::cancelled()),
        ]));

        assert_eq!(
            buffer.lines(),
            vec!["Fuzzing complete!", "3 requests, 1 found, 1 failed"]
        );
    }

    #[test]
    fn test_empty_run_reports_nothing() {
        let (console, buffer) = Console::capture();
        let reporter = Reporter::new(console, OutputFormat::Text);
        assert!(reporter.report(&FuzzResultSet::new()).is_empty());
        assert!(buffer.lines().is_empty());
    }
}
