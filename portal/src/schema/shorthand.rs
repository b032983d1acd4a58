//! Simplified schema shorthand and its translation to [`NativeSchema`].
//!
//! A leaf is a primitive name optionally followed by `|` and modifiers:
//!
//! - `"string"` is a required string
//! - `"number|notrequired"` is an optional number
//! - `"application/x-ndjson|raw"` must equal the literal text before `|`
//!
//! Sequences validate positionally and mappings validate per key. Both
//! translate to required schemas that reject unknown keys or extra items.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

use super::native::{NativeSchema, SchemaKind};
use crate::error::ConfigError;

/// A schema written in shorthand form.
///
/// ## Examples
///
/// ```rust
/// use portal::schema::{transform_schema, Shorthand};
///
/// let shorthand = Shorthand::keyed([
///     ("index", Shorthand::from("string")),
///     ("refresh", Shorthand::from("bool|notrequired")),
/// ]);
/// let native = transform_schema(&shorthand).unwrap();
/// assert!(native.is_required());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Shorthand {
    /// A primitive name with optional `|modifier` suffix.
    Leaf(String),
    /// Positional array items.
    Ordered(Vec<Shorthand>),
    /// Object keys, each with its own shorthand.
    Keyed(IndexMap<String, Shorthand>),
    /// An embedded native schema, passed through untouched.
    Native(NativeSchema),
}

impl Shorthand {
    /// Builds a sequence shorthand.
    pub fn ordered(items: impl IntoIterator<Item = Shorthand>) -> Self {
        Self::Ordered(items.into_iter().collect())
    }

    /// Builds a mapping shorthand.
    pub fn keyed<K: Into<String>>(entries: impl IntoIterator<Item = (K, Shorthand)>) -> Self {
        Self::Keyed(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Reads shorthand written as JSON.
    ///
    /// Strings are leaves, arrays are sequences and objects are mappings.
    /// Any other JSON value is rejected.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::String(leaf) => Ok(Self::Leaf(leaf.clone())),
            Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Ordered),
            Value::Object(map) => map
                .iter()
                .map(|(key, item)| Ok((key.clone(), Self::from_json(item)?)))
                .collect::<Result<IndexMap<_, _>, ConfigError>>()
                .map(Self::Keyed),
            other => Err(ConfigError::UnsupportedSchema {
                name: other.to_string(),
            }),
        }
    }
}

impl From<&str> for Shorthand {
    fn from(leaf: &str) -> Self {
        Self::Leaf(leaf.to_string())
    }
}

impl From<String> for Shorthand {
    fn from(leaf: String) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<NativeSchema> for Shorthand {
    fn from(schema: NativeSchema) -> Self {
        Self::Native(schema)
    }
}

/// Translates shorthand into a native schema.
///
/// Native input is returned unchanged. Unknown primitive names and unknown
/// modifiers fail with [`ConfigError::UnsupportedSchema`].
pub fn transform_schema(shorthand: &Shorthand) -> Result<NativeSchema, ConfigError> {
    match shorthand {
        Shorthand::Native(schema) => Ok(schema.clone()),
        Shorthand::Leaf(leaf) => transform_leaf(leaf),
        Shorthand::Ordered(items) => {
            let items = items
                .iter()
                .map(transform_schema)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(NativeSchema::ordered(items).required())
        }
        Shorthand::Keyed(entries) => {
            let fields = entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), transform_schema(item)?)))
                .collect::<Result<Vec<_>, ConfigError>>()?;
            Ok(NativeSchema::object(fields).required())
        }
    }
}

#[derive(Default)]
struct Modifiers {
    not_required: bool,
    raw: bool,
}

fn parse_modifiers(text: &str) -> Result<Modifiers, ConfigError> {
    let mut modifiers = Modifiers::default();
    for token in text
        .split(['|', ','])
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        match token.to_ascii_lowercase().as_str() {
            "notrequired" => modifiers.not_required = true,
            "raw" => modifiers.raw = true,
            _ => {
                return Err(ConfigError::UnsupportedSchema {
                    name: token.to_string(),
                });
            }
        }
    }
    Ok(modifiers)
}

fn transform_leaf(leaf: &str) -> Result<NativeSchema, ConfigError> {
    let (name, modifiers) = match leaf.split_once('|') {
        Some((name, rest)) => (name.trim(), parse_modifiers(rest)?),
        None => (leaf.trim(), Modifiers::default()),
    };

    let kind = if modifiers.raw {
        SchemaKind::Literal(Value::String(name.to_string()))
    } else {
        primitive(name)?
    };
    trace!(leaf, "Translated schema shorthand");

    let schema = NativeSchema::new(kind);
    Ok(if modifiers.not_required {
        schema
    } else {
        schema.required()
    })
}

fn primitive(name: &str) -> Result<SchemaKind, ConfigError> {
    match name.to_ascii_lowercase().as_str() {
        "string" => Ok(SchemaKind::String),
        "number" => Ok(SchemaKind::Number),
        "integer" => Ok(SchemaKind::Integer),
        "bool" | "boolean" => Ok(SchemaKind::Boolean),
        "any" => Ok(SchemaKind::Any),
        _ => Err(ConfigError::UnsupportedSchema {
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_native;
    use serde_json::json;

    #[test]
    fn test_leaf_is_required_by_default() {
        let schema = transform_schema(&"string".into()).unwrap();
        assert!(schema.is_required());
        assert_eq!(schema.kind(), &SchemaKind::String);
    }

    #[test]
    fn test_notrequired_modifier_is_case_insensitive() {
        let schema = transform_schema(&"number|NotRequired".into()).unwrap();
        assert!(!schema.is_required());
        assert_eq!(schema.kind(), &SchemaKind::Number);
    }

    #[test]
    fn test_bool_aliases() {
        for name in ["bool", "boolean", "Boolean"] {
            let schema = transform_schema(&name.into()).unwrap();
            assert_eq!(schema.kind(), &SchemaKind::Boolean);
        }
    }

    #[test]
    fn test_raw_modifier_is_literal() {
        let schema = transform_schema(&"application/x-ndjson|raw".into()).unwrap();
        assert_eq!(
            schema.kind(),
            &SchemaKind::Literal(json!("application/x-ndjson"))
        );
    }

    #[test]
    fn test_combined_modifiers() {
        let schema = transform_schema(&"v1|raw,notrequired".into()).unwrap();
        assert!(!schema.is_required());
        assert!(validate_native(None, &schema).is_ok());
        assert!(validate_native(Some(&json!("v1")), &schema).is_ok());
        assert!(validate_native(Some(&json!("v2")), &schema).is_err());
    }

    #[test]
    fn test_unknown_primitive_fails() {
        let err = transform_schema(&"symbol".into()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedSchema { name } if name == "symbol"));
    }

    #[test]
    fn test_unknown_modifier_fails() {
        let err = transform_schema(&"string|nullable".into()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedSchema { name } if name == "nullable"));
    }

    #[test]
    fn test_mapping_is_strict_and_required() {
        let shorthand = Shorthand::keyed([(
            "some",
            Shorthand::keyed([("mock", Shorthand::from("string"))]),
        )]);
        let schema = transform_schema(&shorthand).unwrap();

        assert!(validate_native(Some(&json!({ "some": { "mock": "x" } })), &schema).is_ok());
        assert!(validate_native(None, &schema).is_err());
        assert!(validate_native(Some(&json!({ "some": { "mock": "x" }, "x": 1 })), &schema).is_err());
    }

    #[test]
    fn test_sequence_rejects_extra_items() {
        let shorthand = Shorthand::ordered(["string".into(), "integer|notrequired".into()]);
        let schema = transform_schema(&shorthand).unwrap();

        assert!(validate_native(Some(&json!(["a"])), &schema).is_ok());
        assert!(validate_native(Some(&json!(["a", 1])), &schema).is_ok());
        assert!(validate_native(Some(&json!(["a", 1, 2])), &schema).is_err());
    }

    #[test]
    fn test_native_passes_through_unchanged() {
        let native = NativeSchema::object([("id", NativeSchema::integer())]).allow_unknown();
        let once = transform_schema(&Shorthand::from(native.clone())).unwrap();
        let twice = transform_schema(&Shorthand::from(once.clone())).unwrap();
        assert_eq!(once, native);
        assert_eq!(twice, native);
    }

    #[test]
    fn test_from_json() {
        let shorthand = Shorthand::from_json(&json!({
            "id": "integer",
            "tags": ["string", "string|notrequired"],
        }))
        .unwrap();
        let schema = transform_schema(&shorthand).unwrap();
        assert!(validate_native(Some(&json!({ "id": 1, "tags": ["a"] })), &schema).is_ok());

        assert!(Shorthand::from_json(&json!({ "id": 3 })).is_err());
    }
}
