//! Decoded response bodies.

use bytes::Bytes;
use http::HeaderMap;
use serde_json::Value;

/// A response body decoded according to its `Content-Type`.
///
/// `application/json` and `+json` media types are parsed as JSON, falling
/// back to text when the body is not valid JSON. Other bodies are text when
/// they are valid UTF-8 and binary otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseBody {
    /// No body.
    #[default]
    Empty,
    /// Parsed JSON.
    Json(Value),
    /// UTF-8 text.
    Text(String),
    /// Anything else.
    Binary(Bytes),
}

impl ResponseBody {
    /// Decodes `body` using the `Content-Type` in `headers`.
    pub fn decode(headers: &HeaderMap, body: &Bytes) -> Self {
        if body.is_empty() {
            return Self::Empty;
        }

        if is_json(headers) {
            if let Ok(value) = serde_json::from_slice::<Value>(body) {
                return Self::Json(value);
            }
        }

        match std::str::from_utf8(body) {
            Ok(text) => Self::Text(text.to_string()),
            Err(_) => Self::Binary(body.clone()),
        }
    }

    /// Returns `true` for an empty body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The JSON value, if the body was JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// The text, if the body was text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The bytes, if the body was binary.
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Converts into the JSON value, returning `Err(self)` for other bodies.
    pub fn into_json(self) -> Result<Value, Self> {
        match self {
            Self::Json(v) => Ok(v),
            other => Err(other),
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|media| media.trim().to_ascii_lowercase())
        .is_some_and(|media| media == "application/json" || media.ends_with("+json"))
}
