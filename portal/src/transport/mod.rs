//! The transport seam between the engine and the network.
//!
//! The engine builds a [`RequestDescriptor`] per call and hands it to an
//! injected [`Transport`], which returns a [`RawResponse`]. Pooling, retries
//! and timeouts are the transport's business; [`ReqwestTransport`] is the
//! stock implementation.

mod reqwest_transport;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::Value;
use url::Url;

pub use reqwest_transport::ReqwestTransport;

use crate::error::TransportError;
use crate::method::RestMethod;

/// Performs network I/O for a fully built request.
///
/// Implementations must not modify the descriptor's semantics: the URL,
/// headers and body are final when `send` is called.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Sends the request and returns the raw response.
    ///
    /// Non-success statuses should be returned as a [`RawResponse`]; the
    /// engine applies the `on_http_error` policy itself.
    async fn send(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError>;
}

/// Request body in the form the transport sends it.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON by the transport.
    Json(Value),
    /// Pre-serialized text.
    Text(String),
    /// Raw bytes.
    Binary(Bytes),
}

/// A fully resolved, transport-ready request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP verb.
    pub method: RestMethod,
    /// Base URL the path is appended to.
    pub base_url: Url,
    /// Resolved path with merged query string.
    pub url: String,
    /// Final request headers.
    pub headers: HeaderMap,
    /// Request body, if any.
    pub body: Option<RequestBody>,
    /// Whether the effective `Content-Type` is `application/json`.
    pub json: bool,
    /// Timeout in milliseconds.
    pub timeout_ms: u64,
    /// Extra attempts the transport may make.
    pub retries: u32,
    /// Whether non-success statuses fail the call.
    pub throw_on_http_error: bool,
}

impl RequestDescriptor {
    /// Base URL and path joined into one absolute URL string.
    ///
    /// The path is appended to the base URL's path rather than replacing it,
    /// so a base of `http://h/api` and a path of `/items` give
    /// `http://h/api/items`.
    pub fn full_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        if self.url.is_empty() {
            base.to_string()
        } else if self.url.starts_with('/') || self.url.starts_with('?') {
            format!("{base}{}", self.url)
        } else {
            format!("{base}/{}", self.url)
        }
    }
}

/// Status, headers and body as returned by a transport.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// HTTP status code, if the transport knows it.
    pub status_code: Option<u16>,
    /// Status reason phrase.
    pub status_message: Option<String>,
    /// Response headers.
    pub headers: HeaderMap,
    /// Undecoded body.
    pub body: Bytes,
}

impl RawResponse {
    /// A response with `status` and its canonical reason phrase.
    pub fn new(status: u16) -> Self {
        Self {
            status_code: Some(status),
            status_message: StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .map(str::to_string),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Sets a plain text body.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.body = Bytes::from(text.into());
        self
    }

    /// Sets a JSON body.
    pub fn with_json(mut self, value: &Value) -> Self {
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Bytes::from(value.to_string());
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}
