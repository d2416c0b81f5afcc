//! HTTP client module
//!
//! Provides the transport used by the fuzz engine. A completed exchange is
//! always an `Ok(Response)`, whatever its status code; only connection,
//! timeout and protocol failures are reported as `HttpError`.

mod client;
mod method;
#[cfg(test)]
pub(crate) mod mock;
mod response;

pub use client::HttpClient;
pub use method::{FormData, Method};
pub use response::Response;

use async_trait::async_trait;

use crate::error::HttpError;

/// Something that can carry a request to a server and bring back a response
///
/// Implementors provide `send`; the per-verb helpers are derived from it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a request, with an optional url-encoded form body
    async fn send(
        &self,
        method: Method,
        url: &str,
        form: Option<&FormData>,
    ) -> Result<Response, HttpError>;

    async fn get(&self, url: &str) -> Result<Response, HttpError> {
        self.send(Method::Get, url, None).await
    }

    async fn head(&self, url: &str) -> Result<Response, HttpError> {
        self.send(Method::Head, url, None).await
    }

    async fn options(&self, url: &str) -> Result<Response, HttpError> {
        self.send(Method::Options, url, None).await
    }

    async fn trace(&self, url: &str) -> Result<Response, HttpError> {
        self.send(Method::Trace, url, None).await
    }

    async fn delete(&self, url: &str) -> Result<Response, HttpError> {
        self.send(Method::Delete, url, None).await
    }

    async fn put(&self, url: &str, form: &FormData) -> Result<Response, HttpError> {
        self.send(Method::Put, url, Some(form)).await
    }

    async fn post(&self, url: &str, form: &FormData) -> Result<Response, HttpError> {
        self.send(Method::Post, url, Some(form)).await
    }

    async fn patch(&self, url: &str, form: &FormData) -> Result<Response, HttpError> {
        self.send(Method::Patch, url, Some(form)).await
    }
}
