//! HTTP client implementation

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::error::Error as _;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::method::{FormData, Method};
use super::response::Response;
use super::Transport;
use crate::app::{CookieEntry, HttpConfig};
use crate::error::HttpError;

/// HTTP client wrapper
///
/// Configuration is applied once at construction. The client is then
/// shared read-only by every probe.
pub struct HttpClient {
    /// Inner reqwest client
    client: reqwest::Client,

    /// Per-request timeout
    timeout: Duration,

    /// User agent string
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let mut headers = HeaderMap::new();
        for entry in &config.headers {
            let name = HeaderName::from_str(&entry.name).map_err(|e| HttpError::InvalidHeader {
                name: entry.name.clone(),
                reason: e.to_string(),
            })?;
            let value =
                HeaderValue::from_str(&entry.value).map_err(|e| HttpError::InvalidHeader {
                    name: entry.name.clone(),
                    reason: e.to_string(),
                })?;
            headers.append(name, value);
        }

        // Validated up front so a bad agent string fails here, not inside reqwest
        HeaderValue::from_str(&config.user_agent).map_err(|e| HttpError::InvalidHeader {
            name: "User-Agent".into(),
            reason: e.to_string(),
        })?;

        let jar = Arc::new(Jar::default());
        for cookie in &config.cookies {
            add_cookie(&jar, cookie)?;
        }

        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(redirect)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_provider(jar)
            .build()
            .map_err(|e| HttpError::ClientBuild(error_chain(&e)))?;

        Ok(Self {
            client,
            timeout,
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Map a reqwest failure onto the transport error taxonomy
    fn classify(&self, error: reqwest::Error) -> HttpError {
        if error.is_timeout() {
            HttpError::Timeout(self.timeout.as_millis() as u64)
        } else if error.is_connect() {
            HttpError::ConnectionError(error_chain(&error))
        } else if error.is_builder() {
            HttpError::InvalidUrl(error_chain(&error))
        } else {
            HttpError::RequestFailed(error_chain(&error))
        }
    }

    /// Build response from reqwest response
    async fn build_response(
        &self,
        response: reqwest::Response,
        start: Instant,
    ) -> Result<Response, HttpError> {
        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("")
            .to_string();

        let http_version = format!("{:?}", response.version());

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.as_str().to_string(), v.to_string());
            }
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let size = body.len();

        Ok(Response {
            status,
            status_text,
            headers,
            body: body.to_vec(),
            duration_ms: start.elapsed().as_millis() as u64,
            size,
            http_version,
        })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(
        &self,
        method: Method,
        url: &str,
        form: Option<&FormData>,
    ) -> Result<Response, HttpError> {
        let start = Instant::now();

        let parsed =
            url::Url::parse(url).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", url, e)))?;

        let mut builder = self.client.request(method.into(), parsed);
        if let Some(form) = form.filter(|_| method.has_body()) {
            builder = builder.form(form);
        }

        tracing::trace!(%method, url, "sending request");
        let response = builder.send().await.map_err(|e| self.classify(e))?;

        self.build_response(response, start).await
    }
}

/// Seed the jar with a host-scoped cookie
fn add_cookie(jar: &Jar, cookie: &CookieEntry) -> Result<(), HttpError> {
    let host = cookie.domain.trim_start_matches('.');
    let path = if cookie.path.starts_with('/') {
        cookie.path.clone()
    } else {
        format!("/{}", cookie.path)
    };

    let origin = url::Url::parse(&format!("http://{}{}", host, path)).map_err(|e| {
        HttpError::ClientBuild(format!("invalid cookie domain '{}': {}", cookie.domain, e))
    })?;

    jar.add_cookie_str(
        &format!("{}={}; Path={}", cookie.name, cookie.value, path),
        &origin,
    );
    Ok(())
}

/// Render an error with its source chain, reqwest's top-level message is terse
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
