//! Input validation errors.

use serde_json::Value;
use strum::{Display, EnumIter};
use thiserror::Error;

/// Identifies which part of a call input failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ValidationLabel {
    /// Path arguments bound to the route's placeholders.
    #[strum(serialize = "Parameters")]
    Parameters,
    /// The request payload.
    #[strum(serialize = "Payload")]
    Payload,
    /// The caller-supplied query string.
    #[strum(serialize = "Query string")]
    QueryString,
}

/// A call input rejected by its schema.
///
/// Carries the label of the rejected part, the offending data, a description
/// of the schema it was checked against, and the reason reported by the
/// validator. Always raised before the transport is called.
#[derive(Debug, Error)]
#[error("{label}: provided data {data} failed to meet spec {spec}: {reason}")]
pub struct ValidationError {
    label: ValidationLabel,
    data: Value,
    spec: String,
    reason: String,
}

impl ValidationError {
    /// Creates a validation error.
    ///
    /// `data` is `None` when the part was not supplied at all.
    pub fn new(
        label: ValidationLabel,
        data: Option<&Value>,
        spec: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            label,
            data: data.cloned().unwrap_or(Value::Null),
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    /// Which part of the input failed.
    pub fn label(&self) -> ValidationLabel {
        self.label
    }

    /// The data that failed validation (`null` when absent).
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Description of the schema the data was checked against.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Why the validator rejected the data.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
