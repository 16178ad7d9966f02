use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use hyper::{StatusCode, header::HeaderValue};
use thiserror::Error;

/// Custom error type for HTTP client operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpClientError {
    /// Error when connection to backend fails
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error when the upstream does not answer within the configured window
    #[error("Timeout error after {0:?}")]
    Timeout(Duration),

    /// Error when request is invalid
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error while reading the upstream response body
    #[error("Body error: {0}")]
    BodyError(String),
}

/// Result type alias for HTTP client operations
pub type HttpClientResult<T> = Result<T, HttpClientError>;

/// A fully buffered upstream reply.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// HttpClient defines the port (interface) for fetching from the backend
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// Issue a single GET against `url`.
    ///
    /// # Arguments
    /// * `url` - Absolute backend URL
    /// * `accept` - Value for the outgoing `Accept` header
    ///
    /// # Returns
    /// The buffered upstream response, or an error for transport failures and
    /// timeouts. Non-2xx statuses are *not* errors at this layer.
    async fn get(&self, url: &str, accept: &'static str) -> HttpClientResult<UpstreamResponse>;
}
