//! Request payloads.

use std::borrow::Cow;

use bytes::Bytes;
use serde_json::Value;

use crate::transport::RequestBody;

/// The body a caller supplies to a route.
///
/// Only [`Payload::Structured`] objects receive payload-targeted
/// credentials.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A JSON document.
    Structured(Value),
    /// Plain text, sent as-is.
    Text(String),
    /// Newline-delimited JSON, one document per line.
    NdJson(Vec<Value>),
    /// Raw bytes, sent as-is.
    Raw(Bytes),
}

impl Payload {
    /// Newline-delimited JSON from a sequence of documents.
    pub fn ndjson(lines: impl IntoIterator<Item = Value>) -> Self {
        Self::NdJson(lines.into_iter().collect())
    }

    /// The payload as JSON for validation.
    ///
    /// Text and raw bytes become JSON strings; NDJSON becomes an array.
    pub fn as_value(&self) -> Cow<'_, Value> {
        match self {
            Self::Structured(value) => Cow::Borrowed(value),
            Self::Text(text) => Cow::Owned(Value::String(text.clone())),
            Self::NdJson(lines) => Cow::Owned(Value::Array(lines.clone())),
            Self::Raw(bytes) => Cow::Owned(Value::String(String::from_utf8_lossy(bytes).into_owned())),
        }
    }

    /// Mutable access to a structured object payload.
    pub(crate) fn as_object_mut(&mut self) -> Option<&mut serde_json::Map<String, Value>> {
        match self {
            Self::Structured(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Converts into a transport body.
    ///
    /// Structured payloads stay JSON when `json` is set and are serialized
    /// to text otherwise.
    pub fn into_body(self, json: bool) -> RequestBody {
        match self {
            Self::Structured(value) if json => RequestBody::Json(value),
            Self::Structured(value) => RequestBody::Text(value.to_string()),
            Self::Text(text) => RequestBody::Text(text),
            Self::NdJson(lines) => {
                let mut text = String::new();
                for line in &lines {
                    text.push_str(&line.to_string());
                    text.push('\n');
                }
                RequestBody::Text(text)
            }
            Self::Raw(bytes) => RequestBody::Binary(bytes),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Self::Raw(bytes)
    }
}
