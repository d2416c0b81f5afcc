//! Scriptable transport for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{FormData, Method, Response, Transport};
use crate::error::HttpError;

#[derive(Debug, Clone)]
pub(crate) enum MockReply {
    Status(u16),
    Fail(HttpError),
    /// Never answers
    Hang,
}

type DelayFn = Box<dyn Fn(&str) -> Duration + Send + Sync>;

/// Answers by exact URL, counting requests and peak concurrency
pub(crate) struct MockTransport {
    routes: HashMap<String, MockReply>,
    default: MockReply,
    delay: Option<DelayFn>,
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    seen: Mutex<Vec<(Method, String)>>,
}

impl MockTransport {
    pub fn new(default_status: u16) -> Self {
        Self {
            routes: HashMap::new(),
            default: MockReply::Status(default_status),
            delay: None,
            requests: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn route(mut self, url: &str, reply: MockReply) -> Self {
        self.routes.insert(url.to_string(), reply);
        self
    }

    pub fn with_delay(mut self, delay: impl Fn(&str) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn seen_urls(&self) -> Vec<String> {
        self.seen.lock().iter().map(|(_, url)| url.clone()).collect()
    }

    pub fn seen_methods(&self) -> Vec<Method> {
        self.seen.lock().iter().map(|(method, _)| *method).collect()
    }
}

/// Decrements the in-flight gauge even when the request future is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        _form: Option<&FormData>,
    ) -> Result<Response, HttpError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push((method, url.to_string()));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(url)).await;
        }

        match self.routes.get(url).unwrap_or(&self.default) {
            MockReply::Status(status) => Ok(Response {
                status: *status,
                ..Default::default()
            }),
            MockReply::Fail(error) => Err(error.clone()),
            MockReply::Hang => std::future::pending().await,
        }
    }
}
