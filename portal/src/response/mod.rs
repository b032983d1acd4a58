//! The public response shape returned by route functions.

mod body;

use http::HeaderMap;
use serde::de::DeserializeOwned;

pub use body::ResponseBody;

use crate::transport::RawResponse;

/// Status code and reason phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    /// Numeric status code, when the transport reported one.
    pub code: Option<u16>,
    /// Reason phrase, e.g. `Not Found`.
    pub word: Option<String>,
}

/// A transformed transport response.
///
/// The body is decoded by content type; the untouched [`RawResponse`] is
/// kept alongside for callers that need the original bytes.
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code and reason phrase.
    pub status: Status,
    /// Decoded body.
    pub body: ResponseBody,
    /// Response headers.
    pub headers: HeaderMap,
    /// The response as the transport returned it.
    pub raw: RawResponse,
}

impl Response {
    /// Transforms a raw transport response.
    pub fn from_raw(raw: RawResponse) -> Self {
        Self {
            status: Status {
                code: raw.status_code,
                word: raw.status_message.clone(),
            },
            body: ResponseBody::decode(&raw.headers, &raw.body),
            headers: raw.headers.clone(),
            raw,
        }
    }

    /// Whether the status is 2xx or 3xx. A missing status counts as success.
    pub fn is_success(&self) -> bool {
        self.status.code.is_none_or(|code| (200..400).contains(&code))
    }

    /// Deserializes the raw body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.raw.body)
    }
}
