//! Application state management

use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

use super::config::Config;
use crate::error::{FuzzerError, UrlfuzzError};
use crate::fuzzer::{FuzzResultSet, Fuzzer, FuzzerState, Wordlist};
use crate::http::{HttpClient, Transport};
use crate::reporting::{Console, Finding, Reporter};

/// Phase of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Ready,
    LoadingWordlist,
    Fuzzing,
    Reporting,
    Finished,
    Failed,
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub results: FuzzResultSet,
    pub findings: Vec<Finding>,
}

/// Main application
pub struct App {
    config: Config,
    fuzzer: Arc<Fuzzer>,
    reporter: Reporter,
    console: Console,
    state: Arc<RwLock<AppState>>,
}

impl App {
    /// Create the application with a real HTTP client
    pub fn new(config: Config, console: Console) -> Result<Self, UrlfuzzError> {
        console.line("Load Http module...");
        let client = HttpClient::new(&config.http)?;
        tracing::debug!(user_agent = client.user_agent(), "HTTP client ready");

        Ok(Self::with_transport(config, Arc::new(client), console))
    }

    /// Create the application over any transport
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>, console: Console) -> Self {
        let fuzzer = Arc::new(Fuzzer::new(
            config.fuzzer.clone(),
            transport,
            console.clone(),
        ));
        let reporter = Reporter::new(console.clone(), config.output.format);

        Self {
            config,
            fuzzer,
            reporter,
            console,
            state: Arc::new(RwLock::new(AppState::Ready)),
        }
    }

    /// Handle to the engine, for stopping a run from elsewhere
    pub fn fuzzer(&self) -> Arc<Fuzzer> {
        self.fuzzer.clone()
    }

    pub fn state(&self) -> AppState {
        *self.state.read()
    }

    /// Load the wordlist, probe every word and report findings
    ///
    /// The wordlist is read in full before anything is sent, so a load
    /// failure means no request is ever issued.
    pub async fn run(&self, wordlist_path: &Path, base_url: &str) -> Result<RunSummary, UrlfuzzError> {
        let result = self.run_inner(wordlist_path, base_url).await;
        *self.state.write() = match &result {
            Ok(_) => AppState::Finished,
            Err(_) => AppState::Failed,
        };
        result
    }

    async fn run_inner(&self, wordlist_path: &Path, base_url: &str) -> Result<RunSummary, UrlfuzzError> {
        validate_base_url(base_url)?;

        self.set_state(AppState::LoadingWordlist);
        self.console.line("Load wordlist...");
        let wordlist = Wordlist::from_file(wordlist_path, &self.config.wordlist)?;
        if wordlist.is_empty() {
            tracing::warn!(path = %wordlist_path.display(), "Wordlist has no words");
        }

        self.set_state(AppState::Fuzzing);
        self.console.line("Fuzzing...");
        let results = self.fuzzer.fuzz(base_url, wordlist.words()).await?;
        if self.fuzzer.state() == FuzzerState::Stopped {
            tracing::warn!("Run was stopped, reporting partial results");
        }

        self.set_state(AppState::Reporting);
        let findings = self.reporter.report(&results);
        self.reporter.complete(&results);

        Ok(RunSummary { results, findings })
    }

    fn set_state(&self, state: AppState) {
        tracing::debug!(?state, "Run phase");
        *self.state.write() = state;
    }
}

/// Require an absolute http(s) URL with a host
pub fn validate_base_url(base_url: &str) -> Result<(), FuzzerError> {
    if base_url.trim().is_empty() {
        return Err(FuzzerError::EmptyBaseUrl);
    }

    let invalid = |reason: String| FuzzerError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let parsed = url::Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".into()));
    }

    Ok(())
}
