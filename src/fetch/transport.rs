//! HTTP transport seam for the fetcher.
//!
//! [`Transport`] performs a single bounded GET and returns the status, the
//! headers the fetcher cares about, and the full body. [`HttpTransport`] is the
//! `reqwest` implementation; tests substitute their own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use tracing::{debug, instrument};

use super::config::FetcherConfig;
use super::error::TransportError;
use crate::user_agent;

/// A completed HTTP exchange, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// Raw `Content-Disposition` header, if present.
    pub content_disposition: Option<String>,
    /// Full response body. Empty for non-2xx responses.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response with the given status and body and no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            content_disposition: None,
            body: body.into(),
        }
    }

    /// Sets the `Content-Type` header.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the `Content-Disposition` header.
    #[must_use]
    pub fn with_content_disposition(mut self, value: impl Into<String>) -> Self {
        self.content_disposition = Some(value.into());
        self
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one GET request.
///
/// # Object Safety
///
/// This trait uses `async_trait` so the fetcher can hold a `dyn Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`. Non-2xx statuses are returned as responses, not errors.
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport with connect and read timeouts.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport from the fetcher configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the client cannot be built (for
    /// example when no TLS backend is available).
    pub fn new(config: &FetcherConfig) -> Result<Self, TransportError> {
        Self::with_timeouts(config.connect_timeout, config.read_timeout)
    }

    /// Creates a transport with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the client cannot be built.
    pub fn with_timeouts(
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .gzip(true)
            .user_agent(user_agent::default_fetch_user_agent())
            .build()
            .map_err(TransportError::client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self), fields(url = %url))]
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, e))?;

        let status = response.status().as_u16();
        let content_type = header_string(&response, CONTENT_TYPE);
        let content_disposition = header_string(&response, CONTENT_DISPOSITION);
        debug!(status, content_type = ?content_type, "response received");

        if !response.status().is_success() {
            return Ok(TransportResponse {
                status,
                content_type,
                content_disposition,
                body: Vec::new(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(url, e))?
            .to_vec();
        debug!(bytes = body.len(), "body received");

        Ok(TransportResponse {
            status,
            content_type,
            content_disposition,
            body,
        })
    }
}

fn map_reqwest_error(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(url)
    } else {
        TransportError::network(url, error)
    }
}

fn header_string(
    response: &reqwest::Response,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
