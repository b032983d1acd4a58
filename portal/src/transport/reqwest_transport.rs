//! [`Transport`] backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{Span, debug, instrument, warn};

use super::{RawResponse, RequestBody, RequestDescriptor, Transport};
use crate::error::TransportError;

/// Sends requests with a pooled `reqwest::Client`.
///
/// Idempotent requests that fail to connect or time out are re-sent up to
/// `retries` more times, immediately and without backoff. Every other
/// failure, and every HTTP status, is returned as-is.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a fresh connection pool.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send_once(
        &self,
        request: &RequestDescriptor,
        url: &str,
    ) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.to_http(), url)
            .headers(request.headers.clone())
            .timeout(Duration::from_millis(request.timeout_ms));

        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Text(text)) => builder.body(text.clone()),
            Some(RequestBody::Binary(bytes)) => builder.body(bytes.clone()),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| classify(e, request.timeout_ms))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify(e, request.timeout_ms))?;

        Ok(RawResponse {
            status_code: Some(status.as_u16()),
            status_message: status.canonical_reason().map(str::to_string),
            headers,
            body,
        })
    }
}

fn classify(error: reqwest::Error, timeout_ms: u64) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            duration_ms: timeout_ms,
        }
    } else if error.is_connect() {
        TransportError::Connection(error.to_string())
    } else {
        TransportError::Request(error)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(
        name = "portal_transport",
        skip(self, request),
        fields(
            http.method = %request.method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            attempts = tracing::field::Empty,
        )
    )]
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        let url = request.full_url();
        Span::current().record("http.url", url.as_str());

        let max_attempts = if request.method.is_idempotent() {
            request.retries.saturating_add(1)
        } else {
            1
        };

        let mut attempt = 1;
        loop {
            match self.send_once(&request, &url).await {
                Ok(raw) => {
                    Span::current().record("attempts", attempt);
                    if let Some(code) = raw.status_code {
                        Span::current().record("http.status_code", code);
                    }
                    debug!(bytes = raw.body.len(), "Received response");
                    return Ok(raw);
                }
                Err(err) if attempt < max_attempts && err.is_retryable() => {
                    warn!(attempt, max_attempts, error = %err, "Request failed, retrying");
                    attempt += 1;
                }
                Err(err) => {
                    Span::current().record("attempts", attempt);
                    return Err(err);
                }
            }
        }
    }
}
