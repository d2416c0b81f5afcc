//! Application configuration management

use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::fuzzer::{FuzzerConfig, WordlistOptions};
use crate::reporting::OutputFormat;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP client settings
    pub http: HttpConfig,

    /// Dispatch settings
    pub fuzzer: FuzzerConfig,

    /// Wordlist parsing settings
    pub wordlist: WordlistOptions,

    /// Console output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent string
    pub user_agent: String,

    /// Follow redirects
    pub follow_redirects: bool,

    /// Maximum redirect depth
    pub max_redirects: usize,

    /// Headers sent with every request
    pub headers: Vec<HeaderEntry>,

    /// Cookies preloaded into the client's jar
    pub cookies: Vec<CookieEntry>,
}

/// A single default header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

/// A cookie scoped to a domain and path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieEntry {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// How findings are rendered
    pub format: OutputFormat,

    /// Wait for a line on stdin before exiting
    pub pause_on_exit: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("urlfuzz/{}", env!("CARGO_PKG_VERSION")),
            follow_redirects: true,
            max_redirects: 10,
            headers: Vec::new(),
            cookies: Vec::new(),
        }
    }
}

impl HeaderEntry {
    /// Parse a `Name: Value` pair as given on the command line
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let (name, value) = raw.split_once(':').ok_or_else(|| ConfigError::ValidationError {
            field: "header".into(),
            reason: format!("'{}' is not in 'Name: Value' form", raw),
        })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "header".into(),
                reason: format!("'{}' has an empty name", raw),
            });
        }

        Ok(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
        })
    }
}

impl CookieEntry {
    /// Parse a `name=value` pair, scoping it to `domain` at path `/`
    pub fn parse(raw: &str, domain: &str) -> Result<Self, ConfigError> {
        let (name, value) = raw.split_once('=').ok_or_else(|| ConfigError::ValidationError {
            field: "cookie".into(),
            reason: format!("'{}' is not in 'name=value' form", raw),
        })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "cookie".into(),
                reason: format!("'{}' has an empty name", raw),
            });
        }

        Ok(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
            domain: domain.to_string(),
            path: default_cookie_path(),
        })
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// An explicit path must exist. Without one, the default location is
    /// consulted and defaults are used when nothing is there.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let (config_path, explicit) = match path {
            Some(p) => (PathBuf::from(p), true),
            None => match Self::default_config_path() {
                Ok(p) => (p, false),
                Err(_) => {
                    tracing::debug!("No configuration directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !explicit && !config_path.exists() {
            tracing::debug!("No configuration file found, using defaults");
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|source| ConfigError::ReadError {
                path: config_path.display().to_string(),
                source,
            })?;

        let config = Self::from_toml(&contents)?;
        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    /// Parse configuration from a TOML document
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Check values that would otherwise fail late
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                field: "http.timeout_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.http.follow_redirects && self.http.max_redirects == 0 {
            return Err(ConfigError::ValidationError {
                field: "http.max_redirects".into(),
                reason: "must be greater than 0 when follow_redirects is set".into(),
            });
        }

        HeaderValue::from_str(&self.http.user_agent).map_err(|e| ConfigError::ValidationError {
            field: "http.user_agent".into(),
            reason: e.to_string(),
        })?;

        for header in &self.http.headers {
            let invalid = |reason: String| ConfigError::ValidationError {
                field: "http.headers".into(),
                reason: format!("'{}': {}", header.name, reason),
            };
            HeaderName::from_bytes(header.name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
            HeaderValue::from_str(&header.value).map_err(|e| invalid(e.to_string()))?;
        }

        for cookie in &self.http.cookies {
            if cookie.domain.is_empty() {
                return Err(ConfigError::ValidationError {
                    field: "http.cookies".into(),
                    reason: format!("cookie '{}' has no domain", cookie.name),
                });
            }
        }

        Ok(())
    }

    /// Get default configuration file path
    fn default_config_path() -> Result<PathBuf, ConfigError> {
        let dirs = directories::ProjectDirs::from("io", "urlfuzz", "urlfuzz")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get data directory path
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        let dirs = directories::ProjectDirs::from("io", "urlfuzz", "urlfuzz")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.data_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.http.user_agent.starts_with("urlfuzz/"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [http]
            timeout_secs = 5

            [[http.headers]]
            name = "X-Api-Key"
            value = "secret"

            [[http.cookies]]
            name = "session"
            value = "abc"
            domain = "example.com"

            [fuzzer]
            max_concurrent = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.max_redirects, 10);
        assert_eq!(config.http.headers[0].name, "X-Api-Key");
        assert_eq!(config.http.cookies[0].path, "/");
        assert_eq!(config.fuzzer.max_concurrent, 4);
        assert!(config.wordlist.strip_carriage_returns);
    }

    #[test]
    fn test_generated_config_round_trips() {
        let rendered = Config::default().to_toml().unwrap();
        let parsed = Config::from_toml(&rendered).unwrap();
        assert_eq!(parsed.fuzzer.max_concurrent, Config::default().fuzzer.max_concurrent);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_invalid_headers_rejected() {
        let mut config = Config::default();
        config.http.headers.push(HeaderEntry {
            name: "Bad Name".into(),
            value: "x".into(),
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { ref field, .. }) if field == "http.headers"
        ));

        let mut config = Config::default();
        config.http.headers.push(HeaderEntry::parse("X-Ok: line\nbreak").unwrap());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.http.user_agent = "agent\r\n".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.http.headers.push(HeaderEntry::parse("X-Api-Key: secret").unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = Config::load(Some("/nonexistent/urlfuzz/config.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nformat = \"json\"\npause_on_exit = true").unwrap();

        let config = Config::load(file.path().to_str()).unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pause_on_exit);
    }

    #[test]
    fn test_header_parsing() {
        let header = HeaderEntry::parse("Authorization: Bearer x:y").unwrap();
        assert_eq!(header.name, "Authorization");
        assert_eq!(header.value, "Bearer x:y");

        assert!(HeaderEntry::parse("no-colon").is_err());
        assert!(HeaderEntry::parse(": value").is_err());
    }

    #[test]
    fn test_cookie_parsing() {
        let cookie = CookieEntry::parse("session=a=b", "example.com").unwrap();
        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "a=b");
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.path, "/");

        assert!(CookieEntry::parse("novalue", "example.com").is_err());
    }
}
