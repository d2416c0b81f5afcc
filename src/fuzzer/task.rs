//! A single probe and its outcome

use serde::{Deserialize, Serialize};

use crate::error::HttpError;
use crate::http::{FormData, Method, Transport};

/// Join a base URL and a word with exactly one slash between them
///
/// Only slashes at the seam are touched; a trailing slash on the word is
/// kept, and an empty word yields the base URL with a trailing slash.
pub fn build_candidate(base: &str, word: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        word.trim_start_matches('/')
    )
}

/// One probe: a word and the URL built from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzTask {
    /// Position of the word in the submitted list
    pub index: usize,
    pub word: String,
    pub url: String,
}

impl FuzzTask {
    pub fn new(index: usize, base: &str, word: &str) -> Self {
        Self {
            index,
            word: word.to_string(),
            url: build_candidate(base, word),
        }
    }

    /// Issue the request and fold any transport failure into the outcome
    ///
    /// Body-bearing verbs are sent with an empty form.
    pub async fn probe(&self, transport: &dyn Transport, method: Method) -> Outcome {
        let url = self.url.as_str();
        let form = FormData::new();
        let sent = match method {
            Method::Get => transport.get(url).await,
            Method::Head => transport.head(url).await,
            Method::Options => transport.options(url).await,
            Method::Trace => transport.trace(url).await,
            Method::Delete => transport.delete(url).await,
            Method::Put => transport.put(url, &form).await,
            Method::Post => transport.post(url, &form).await,
            Method::Patch => transport.patch(url, &form).await,
        };

        match sent {
            Ok(response) => {
                tracing::trace!(
                    url,
                    status = response.status,
                    reason = %response.status_text,
                    version = %response.http_version,
                    size = response.size,
                    duration_ms = response.duration_ms,
                    "request answered"
                );
                if response.is_redirect() {
                    tracing::debug!(url, location = ?response.header("location"), "redirect not followed");
                }
                Outcome::Status(response.status)
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "probe failed");
                Outcome::Failed(e.into())
            }
        }
    }
}

/// Why a probe produced no status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Connection,
    Request,
    InvalidUrl,
    Cancelled,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

/// Terminal result of a probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The server answered; any status code, 4xx and 5xx included
    Status(u16),
    /// No answer was obtained
    Failed(Failure),
}

impl Outcome {
    pub fn cancelled() -> Self {
        Outcome::Failed(Failure {
            kind: FailureKind::Cancelled,
            message: "cancelled before completion".into(),
        })
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Outcome::Failed(Failure {
            kind: FailureKind::Internal,
            message: message.into(),
        })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Status(code) => Some(*code),
            Outcome::Failed(_) => None,
        }
    }

    /// A finding is an exact 200
    pub fn is_found(&self) -> bool {
        self.status() == Some(200)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl From<HttpError> for Failure {
    fn from(error: HttpError) -> Self {
        let kind = match &error {
            HttpError::Timeout(_) => FailureKind::Timeout,
            HttpError::ConnectionError(_) => FailureKind::Connection,
            HttpError::InvalidUrl(_) => FailureKind::InvalidUrl,
            _ => FailureKind::Request,
        };
        Failure {
            kind,
            message: error.to_string(),
        }
    }
}
