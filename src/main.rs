//! urlfuzz - directory and content discovery
//!
//! Appends every word of a wordlist to a base URL, probes the results
//! concurrently and reports the URLs that answer 200.

mod app;
mod error;
mod fuzzer;
mod http;
mod reporting;

pub use error::*;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::{App, Config, CookieEntry, HeaderEntry};
use crate::fuzzer::{Fuzzer, FuzzerState};
use crate::http::Method;
use crate::reporting::{Console, OutputFormat};

/// Directory and content discovery over HTTP
#[derive(Parser, Debug)]
#[command(name = "urlfuzz")]
#[command(author, version, about = "Directory and content discovery over HTTP", long_about = None)]
struct Cli {
    /// Wordlist file, one word per line
    #[arg(required_unless_present = "generate_config")]
    wordlist: Option<PathBuf>,

    /// Base URL the words are appended to
    #[arg(required_unless_present = "generate_config")]
    url: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "URLFUZZ_CONFIG")]
    config: Option<String>,

    /// Maximum requests in flight (0 for no limit)
    #[arg(short = 't', long, env = "URLFUZZ_CONCURRENCY")]
    concurrency: Option<usize>,

    /// HTTP method for every request
    #[arg(short = 'X', long)]
    method: Option<Method>,

    /// Request timeout in seconds
    #[arg(long, env = "URLFUZZ_TIMEOUT")]
    timeout: Option<u64>,

    /// User-Agent header value
    #[arg(short = 'a', long)]
    user_agent: Option<String>,

    /// Extra header, "Name: Value" (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Cookie for the target host, "name=value" (repeatable)
    #[arg(short = 'b', long = "cookie")]
    cookies: Vec<String>,

    /// Do not print a line for every probe
    #[arg(long)]
    no_progress: bool,

    /// Print findings as JSON lines
    #[arg(long)]
    json: bool,

    /// Wait for Enter before exiting
    #[arg(long)]
    pause: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "URLFUZZ_LOG_LEVEL")]
    log_level: String,

    /// Log file path (enables file logging)
    #[arg(long, env = "URLFUZZ_LOG_FILE")]
    log_file: Option<String>,

    /// Enable JSON structured logging
    #[arg(long, env = "URLFUZZ_LOG_JSON")]
    log_json: bool,

    /// Generate default configuration and exit
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        return generate_default_config();
    }

    init_logging(&cli)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting urlfuzz");

    // clap guarantees both positionals unless --generate-config was given
    let (Some(wordlist), Some(url)) = (cli.wordlist.clone(), cli.url.clone()) else {
        anyhow::bail!("missing required arguments <WORDLIST> <URL>");
    };

    let config = load_config(&cli, &url).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let pause = config.output.pause_on_exit;

    let console = Console::stdout();
    let app = App::new(config, console).map_err(|e| anyhow::anyhow!(e.user_message()))?;

    tokio::spawn(handle_signals(app.fuzzer()));

    let result = app.run(&wordlist, &url).await;

    if pause {
        wait_for_enter().await;
    }

    match result {
        Ok(summary) => {
            tracing::info!(
                state = ?app.state(),
                probes = summary.results.len(),
                findings = summary.findings.len(),
                "urlfuzz finished"
            );
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(e.user_message())),
    }
}

/// Initialize the logging system
///
/// Stdout carries the results, so diagnostics go to stderr or a file.
fn init_logging(cli: &Cli) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if let Some(log_path) = &cli.log_file {
        let file_appender = if log_path.contains('/') || log_path.contains('\\') {
            let path = std::path::Path::new(log_path);
            let dir = path.parent().unwrap_or(std::path::Path::new("."));
            let filename = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("urlfuzz.log");
            RollingFileAppender::new(Rotation::DAILY, dir, filename)
        } else {
            let log_dir = Config::data_dir()
                .map(|d| d.join("logs"))
                .unwrap_or_else(|_| PathBuf::from("."));
            std::fs::create_dir_all(&log_dir)
                .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;
            RollingFileAppender::new(Rotation::DAILY, log_dir, log_path)
        };

        if cli.log_json {
            let file_layer = fmt::layer()
                .json()
                .with_writer(file_appender)
                .with_ansi(false);
            subscriber.with(file_layer).init();
        } else {
            let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);
            subscriber.with(file_layer).init();
        }
    } else if cli.log_json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

/// Load configuration with CLI overrides
fn load_config(cli: &Cli, url: &str) -> Result<Config, UrlfuzzError> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(concurrency) = cli.concurrency {
        config.fuzzer.max_concurrent = concurrency;
    }
    if let Some(method) = cli.method {
        config.fuzzer.method = method;
    }
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.http.user_agent = user_agent.clone();
    }
    if cli.no_progress {
        config.fuzzer.show_progress = false;
    }
    if cli.json {
        config.output.format = OutputFormat::Json;
    }
    if cli.pause {
        config.output.pause_on_exit = true;
    }

    for raw in &cli.headers {
        config.http.headers.push(HeaderEntry::parse(raw)?);
    }

    if !cli.cookies.is_empty() {
        app::validate_base_url(url)?;
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        for raw in &cli.cookies {
            config.http.cookies.push(CookieEntry::parse(raw, &host)?);
        }
    }

    config.validate()?;
    Ok(config)
}

/// Generate default configuration file
fn generate_default_config() -> Result<()> {
    let toml = Config::default()
        .to_toml()
        .context("Failed to serialize configuration")?;

    println!("{}", toml);
    Ok(())
}

/// What a stop signal led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalAction {
    /// The run was asked to stop and report what it has
    Stop,
    /// A stop was already pending, leave now
    Exit,
}

/// The first signal stops the engine, any later one exits the process
fn on_stop_signal(fuzzer: &Fuzzer, signal: &str) -> SignalAction {
    if fuzzer.state() == FuzzerState::Stopped {
        tracing::warn!("Received {} again, exiting", signal);
        return SignalAction::Exit;
    }

    tracing::warn!("Received {}, stopping (repeat to exit immediately)", signal);
    fuzzer.stop();
    SignalAction::Stop
}

/// Handle SIGINT/SIGTERM for the lifetime of the process
#[cfg(unix)]
async fn handle_signals(fuzzer: Arc<Fuzzer>) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigint, mut sigterm) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            _ => {
                tracing::warn!("Failed to register signal handlers");
                return;
            }
        };

    loop {
        let name = tokio::select! {
            Some(()) = sigint.recv() => "SIGINT",
            Some(()) = sigterm.recv() => "SIGTERM",
            else => return,
        };

        if on_stop_signal(&fuzzer, name) == SignalAction::Exit {
            std::process::exit(130);
        }
    }
}

/// Handle Ctrl+C for the lifetime of the process
#[cfg(not(unix))]
async fn handle_signals(fuzzer: Arc<Fuzzer>) {
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to register Ctrl+C handler: {}", e);
            return;
        }

        if on_stop_signal(&fuzzer, "Ctrl+C") == SignalAction::Exit {
            std::process::exit(130);
        }
    }
}

/// Block until a line is read from stdin
async fn wait_for_enter() {
    let read = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)
    })
    .await;

    if let Ok(Err(e)) = read {
        tracing::debug!("Failed to read stdin: {}", e);
    }
}
