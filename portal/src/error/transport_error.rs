//! Transport and HTTP status errors.

use thiserror::Error;

use crate::response::Response;

/// Errors from the transport layer.
///
/// These errors represent network-level failures surfaced by a
/// [`Transport`](crate::Transport), plus non-success HTTP statuses rejected
/// by the engine when `on_http_error` is `reject`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed due to network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned a non-success HTTP status code.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: u16,
        /// Status reason phrase or response text.
        message: String,
        /// The full transformed response.
        response: Box<Response>,
    },

    /// Request exceeded the configured timeout.
    #[error("Request timeout after {duration_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        duration_ms: u64,
    },

    /// Failed to establish connection to the server.
    #[error("Connection failed: {0}")]
    Connection(String),
}

impl TransportError {
    /// Builds an HTTP status error from a rejected response.
    pub fn http_status(response: Response) -> Self {
        let status = response.status.code.unwrap_or_default();
        let message = response
            .body
            .as_text()
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .or_else(|| response.status.word.clone())
            .unwrap_or_else(|| "request failed".to_string());
        Self::HttpStatus {
            status,
            message,
            response: Box::new(response),
        }
    }

    /// Returns `true` if this error is retryable.
    ///
    /// Timeout and connection errors are typically retryable,
    /// while HTTP status errors depend on the status code.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connection(_) => true,
            Self::HttpStatus { status, .. } => {
                // 5xx errors and 429 (rate limit) are retryable
                *status >= 500 || *status == 429
            }
            Self::Request(e) => e.is_timeout() || e.is_connect(),
        }
    }

    /// Returns the HTTP status code if this is an HTTP status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns the rejected response for HTTP status errors.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::HttpStatus { response, .. } => Some(response),
            _ => None,
        }
    }
}
