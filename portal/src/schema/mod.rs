//! Validation specs for route parameters, payloads and query strings.
//!
//! A route accepts three kinds of spec:
//!
//! - a [`NativeSchema`] evaluated by [`validate_native`]
//! - a custom [`Validator`] whose verdict is authoritative
//! - a [`Shorthand`] translated once, when the route is generated
//!
//! Routes call [`ensure_valid`] with the compiled spec before any path
//! binding or network activity.

mod native;
mod shorthand;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

pub use native::{NativeSchema, SchemaKind, SchemaViolation, validate_native, validate_text_form};
pub use shorthand::{Shorthand, transform_schema};

use crate::error::{ConfigError, ValidationError, ValidationLabel};

/// A caller-supplied predicate over JSON data.
///
/// Absent data is passed as `null`.
pub trait Validator: Send + Sync + fmt::Debug {
    /// Returns `true` when `data` is acceptable.
    fn validate(&self, data: &Value) -> bool;
}

/// A validation spec as written on a route.
#[derive(Debug, Clone)]
pub enum ValidationSpec {
    /// A schema the engine evaluates itself.
    Native(NativeSchema),
    /// An external predicate.
    Custom(Arc<dyn Validator>),
    /// Shorthand, translated at route generation.
    Shorthand(Shorthand),
}

impl ValidationSpec {
    /// Wraps a custom validator.
    pub fn custom(validator: impl Validator + 'static) -> Self {
        Self::Custom(Arc::new(validator))
    }

    /// Translates the spec into the form used at call time.
    pub fn compile(&self) -> Result<CompiledSpec, ConfigError> {
        match self {
            Self::Native(schema) => Ok(CompiledSpec::Native(schema.clone())),
            Self::Custom(validator) => Ok(CompiledSpec::Custom(Arc::clone(validator))),
            Self::Shorthand(shorthand) => transform_schema(shorthand).map(CompiledSpec::Native),
        }
    }
}

impl From<NativeSchema> for ValidationSpec {
    fn from(schema: NativeSchema) -> Self {
        Self::Native(schema)
    }
}

impl From<Shorthand> for ValidationSpec {
    fn from(shorthand: Shorthand) -> Self {
        Self::Shorthand(shorthand)
    }
}

impl From<&str> for ValidationSpec {
    fn from(leaf: &str) -> Self {
        Self::Shorthand(Shorthand::from(leaf))
    }
}

impl From<Arc<dyn Validator>> for ValidationSpec {
    fn from(validator: Arc<dyn Validator>) -> Self {
        Self::Custom(validator)
    }
}

/// A validation spec ready to be evaluated.
#[derive(Debug, Clone)]
pub enum CompiledSpec {
    /// Native schema (possibly translated from shorthand).
    Native(NativeSchema),
    /// External predicate.
    Custom(Arc<dyn Validator>),
}

impl CompiledSpec {
    /// Human-readable description used in validation errors.
    pub fn describe(&self) -> String {
        match self {
            Self::Native(schema) => schema.to_string(),
            Self::Custom(validator) => format!("{validator:?}"),
        }
    }
}

/// Checks `data` against `spec`.
///
/// An absent spec always passes. `data` is `None` when the caller did not
/// supply that part of the input. Query strings are checked with
/// [`validate_text_form`], since every query value arrives as text.
pub fn ensure_valid(
    spec: Option<&CompiledSpec>,
    data: Option<&Value>,
    label: ValidationLabel,
) -> Result<(), ValidationError> {
    let Some(spec) = spec else {
        return Ok(());
    };

    let outcome = match spec {
        CompiledSpec::Native(schema) => {
            let outcome = match label {
                ValidationLabel::QueryString => validate_text_form(data, schema),
                _ => validate_native(data, schema),
            };
            outcome.map_err(|violation| violation.to_string())
        }
        CompiledSpec::Custom(validator) => {
            if validator.validate(data.unwrap_or(&Value::Null)) {
                Ok(())
            } else {
                Err("custom validator rejected the data".to_string())
            }
        }
    };

    match outcome {
        Ok(()) => {
            trace!(%label, "Validation passed");
            Ok(())
        }
        Err(reason) => Err(ValidationError::new(label, data, spec.describe(), reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct EvenLength;

    impl Validator for EvenLength {
        fn validate(&self, data: &Value) -> bool {
            data.as_array().is_some_and(|items| items.len() % 2 == 0)
        }
    }

    #[test]
    fn test_absent_spec_is_noop() {
        assert!(ensure_valid(None, None, ValidationLabel::Payload).is_ok());
        assert!(ensure_valid(None, Some(&json!(1)), ValidationLabel::Payload).is_ok());
    }

    #[test]
    fn test_custom_validator_is_authoritative() {
        let spec = ValidationSpec::custom(EvenLength).compile().unwrap();

        assert!(ensure_valid(Some(&spec), Some(&json!([1, 2])), ValidationLabel::Parameters).is_ok());

        let err = ensure_valid(Some(&spec), Some(&json!([1])), ValidationLabel::Parameters)
            .unwrap_err();
        assert_eq!(err.label(), ValidationLabel::Parameters);
        assert_eq!(err.spec(), "EvenLength");
    }

    #[test]
    fn test_custom_validator_sees_null_for_absent_data() {
        #[derive(Debug)]
        struct NullOnly;
        impl Validator for NullOnly {
            fn validate(&self, data: &Value) -> bool {
                data.is_null()
            }
        }

        let spec = ValidationSpec::custom(NullOnly).compile().unwrap();
        assert!(ensure_valid(Some(&spec), None, ValidationLabel::QueryString).is_ok());
    }

    #[test]
    fn test_shorthand_compiles_to_native() {
        let spec = ValidationSpec::from("string").compile().unwrap();
        assert!(matches!(spec, CompiledSpec::Native(_)));

        let err = ensure_valid(Some(&spec), Some(&json!(3)), ValidationLabel::Payload).unwrap_err();
        assert_eq!(err.reason(), "$ must be a string");
        assert_eq!(err.spec(), "string");
    }

    #[test]
    fn test_query_values_are_read_as_text() {
        let spec = ValidationSpec::from(Shorthand::keyed([("size", Shorthand::from("number"))]))
            .compile()
            .unwrap();
        let data = json!({ "size": "10" });

        assert!(ensure_valid(Some(&spec), Some(&data), ValidationLabel::QueryString).is_ok());
        let err = ensure_valid(Some(&spec), Some(&data), ValidationLabel::Payload).unwrap_err();
        assert_eq!(err.reason(), "$.size must be a number");
    }

    #[test]
    fn test_unknown_shorthand_fails_at_compile() {
        let err = ValidationSpec::from("symbol").compile().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedSchema { .. }));
    }

    #[test]
    fn test_missing_payload_is_labelled() {
        let spec = ValidationSpec::from(Shorthand::keyed([(
            "some",
            Shorthand::keyed([("mock", Shorthand::from("string"))]),
        )]))
        .compile()
        .unwrap();

        let err = ensure_valid(Some(&spec), None, ValidationLabel::Payload).unwrap_err();
        assert!(err.to_string().starts_with("Payload: "));
        assert_eq!(err.data(), &Value::Null);
    }
}
