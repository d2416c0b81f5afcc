//! HTTP response types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,

    /// Status text (e.g., "OK", "Not Found")
    pub status_text: String,

    /// Response headers
    pub headers: HashMap<String, String>,

    /// Response body
    pub body: Vec<u8>,

    /// Response time in milliseconds
    pub duration_ms: u64,

    /// Size of the response body in bytes
    pub size: usize,

    /// HTTP version
    pub http_version: String,
}

impl Response {
    /// Check if response is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Get a specific header (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        let name_lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == name_lower)
            .map(|(_, v)| v.as_str())
    }
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 0,
            status_text: String::new(),
            headers: HashMap::new(),
            body: Vec::new(),
            duration_ms: 0,
            size: 0,
            http_version: "HTTP/1.1".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_class() {
        let mut response = Response {
            status: 302,
            ..Default::default()
        };
        assert!(response.is_redirect());

        response.status = 200;
        assert!(!response.is_redirect());
        response.status = 404;
        assert!(!response.is_redirect());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut response = Response::default();
        response
            .headers
            .insert("content-type".to_string(), "text/html".to_string());
        assert_eq!(response.header("Content-Type"), Some("text/html"));
        assert_eq!(response.header("x-missing"), None);
    }
}
