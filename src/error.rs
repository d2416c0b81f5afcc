//! Custom error types for urlfuzz
//!
//! Provides structured error handling with context propagation
//! and user-friendly error messages.

use thiserror::Error;

/// Main error type for urlfuzz operations
#[derive(Error, Debug)]
pub enum UrlfuzzError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Wordlist loading errors
    #[error("Wordlist error: {0}")]
    Wordlist(#[from] WordlistError),

    /// Fuzz engine errors
    #[error("Fuzzer error: {0}")]
    Fuzzer(#[from] FuzzerError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {path}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Configuration directory unavailable")]
    NoConfigDir,
}

/// HTTP client errors
///
/// Only transport-level failures live here. A response with a 4xx or 5xx
/// status is a successful exchange and is returned as data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Wordlist loading errors
#[derive(Error, Debug)]
pub enum WordlistError {
    #[error("Failed to read wordlist {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fuzz engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FuzzerError {
    #[error("Base URL is empty")]
    EmptyBaseUrl,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("A fuzzing run is already in progress")]
    AlreadyRunning,
}

impl UrlfuzzError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            UrlfuzzError::Config(e) => format!("Configuration problem: {}", e.user_hint()),
            UrlfuzzError::Http(e) => format!("Network issue: {}", e.user_hint()),
            UrlfuzzError::Wordlist(e) => {
                format!("An error occurred while loading the file: {}", e.user_hint())
            }
            UrlfuzzError::Fuzzer(e) => format!("Fuzzer issue: {}", e.user_hint()),
        }
    }
}

/// Trait for providing user-friendly hints
pub trait UserHint {
    fn user_hint(&self) -> String;
}

impl UserHint for ConfigError {
    fn user_hint(&self) -> String {
        match self {
            ConfigError::ReadError { path, .. } => {
                format!("Could not read '{}'. Check if the file exists and you have read permissions.", path)
            }
            ConfigError::ParseError(_) => {
                "The configuration file has invalid syntax. Check for TOML formatting errors.".into()
            }
            ConfigError::ValidationError { field, reason } => {
                format!("Invalid value for '{}': {}", field, reason)
            }
            ConfigError::NoConfigDir => {
                "Could not determine a configuration directory. Pass --config explicitly.".into()
            }
        }
    }
}

impl UserHint for HttpError {
    fn user_hint(&self) -> String {
        match self {
            HttpError::ConnectionError(_) => {
                "Could not connect to the server. Check if it's running and accessible.".into()
            }
            HttpError::Timeout(ms) => {
                format!("Request timed out after {}ms. The server may be slow or unresponsive.", ms)
            }
            HttpError::InvalidUrl(url) => {
                format!("'{}' is not a valid URL. Check the format.", url)
            }
            HttpError::InvalidHeader { name, .. } => {
                format!("Header '{}' is not valid. Use the form 'Name: Value'.", name)
            }
            _ => self.to_string(),
        }
    }
}

impl UserHint for WordlistError {
    fn user_hint(&self) -> String {
        match self {
            WordlistError::ReadError { path, source } => {
                format!("{} ({})", source, path)
            }
        }
    }
}

impl UserHint for FuzzerError {
    fn user_hint(&self) -> String {
        match self {
            FuzzerError::InvalidBaseUrl { url, .. } => {
                format!("'{}' is not a valid target. Use a full http:// or https:// URL.", url)
            }
            _ => self.to_string(),
        }
    }
}
