//! Application core module
//!
//! Handles the run lifecycle: configuration, wiring the HTTP client into
//! the fuzz engine, loading the wordlist and reporting.

mod config;
mod state;

pub use config::{Config, CookieEntry, HeaderEntry, HttpConfig};
pub use state::{validate_base_url, App};
