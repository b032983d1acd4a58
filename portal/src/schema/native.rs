//! Native schema representation and its validator.
//!
//! A [`NativeSchema`] is the form every validation spec is reduced to before
//! a route is called. Leaves are optional unless marked
//! [`required`](NativeSchema::required); objects reject keys they do not
//! declare unless [`allow_unknown`](NativeSchema::allow_unknown) is set;
//! ordered arrays reject items beyond the declared positions.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// The shape a [`NativeSchema`] accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Any JSON value.
    Any,
    /// A JSON string.
    String,
    /// Any JSON number.
    Number,
    /// A JSON number without a fractional part.
    Integer,
    /// A JSON boolean.
    Boolean,
    /// Exactly this value.
    Literal(Value),
    /// An array validated position by position.
    Ordered(Vec<NativeSchema>),
    /// An array whose every item matches one schema.
    List(Box<NativeSchema>),
    /// An object with the declared keys.
    Object {
        /// Schema per key, in declaration order.
        fields: IndexMap<String, NativeSchema>,
        /// Whether keys not listed in `fields` are accepted.
        allow_unknown: bool,
    },
}

/// A validation schema the engine can evaluate directly.
///
/// ## Examples
///
/// ```rust
/// use portal::schema::{validate_native, NativeSchema};
/// use serde_json::json;
///
/// let schema = NativeSchema::object([
///     ("name", NativeSchema::string().required()),
///     ("age", NativeSchema::integer()),
/// ])
/// .required();
///
/// assert!(validate_native(Some(&json!({ "name": "Ada" })), &schema).is_ok());
/// assert!(validate_native(Some(&json!({ "age": 36 })), &schema).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NativeSchema {
    kind: SchemaKind,
    required: bool,
}

impl NativeSchema {
    /// Creates an optional schema of the given kind.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            required: false,
        }
    }

    /// Optional schema accepting any value.
    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    /// Optional string schema.
    pub fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    /// Optional number schema.
    pub fn number() -> Self {
        Self::new(SchemaKind::Number)
    }

    /// Optional integer schema.
    pub fn integer() -> Self {
        Self::new(SchemaKind::Integer)
    }

    /// Optional boolean schema.
    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    /// Optional schema matching exactly `value`.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(SchemaKind::Literal(value.into()))
    }

    /// Optional positional array schema.
    pub fn ordered(items: impl IntoIterator<Item = NativeSchema>) -> Self {
        Self::new(SchemaKind::Ordered(items.into_iter().collect()))
    }

    /// Optional homogeneous array schema.
    pub fn list_of(item: NativeSchema) -> Self {
        Self::new(SchemaKind::List(Box::new(item)))
    }

    /// Optional object schema with the given keys.
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, NativeSchema)>) -> Self {
        Self::new(SchemaKind::Object {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            allow_unknown: false,
        })
    }

    /// Marks the schema as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the schema as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Lets an object schema accept undeclared keys. No effect on other kinds.
    pub fn allow_unknown(mut self) -> Self {
        if let SchemaKind::Object { allow_unknown, .. } = &mut self.kind {
            *allow_unknown = true;
        }
        self
    }

    /// Whether an absent value fails validation.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The shape this schema accepts.
    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }
}

impl fmt::Display for NativeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SchemaKind::Any => write!(f, "any")?,
            SchemaKind::String => write!(f, "string")?,
            SchemaKind::Number => write!(f, "number")?,
            SchemaKind::Integer => write!(f, "integer")?,
            SchemaKind::Boolean => write!(f, "boolean")?,
            SchemaKind::Literal(value) => write!(f, "literal({value})")?,
            SchemaKind::Ordered(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")?;
            }
            SchemaKind::List(item) => write!(f, "list({item})")?,
            SchemaKind::Object { fields, .. } => {
                write!(f, "{{")?;
                for (index, (key, field)) in fields.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {field}")?;
                }
                write!(f, "}}")?;
            }
        }
        if !self.required {
            write!(f, "?")?;
        }
        Ok(())
    }
}

/// Why a value failed a [`NativeSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{at} {message}")]
pub struct SchemaViolation {
    /// Location of the offending value, rooted at `$`.
    pub at: String,
    /// What was wrong with it.
    pub message: String,
}

impl SchemaViolation {
    fn new(at: &str, message: impl Into<String>) -> Self {
        Self {
            at: at.to_string(),
            message: message.into(),
        }
    }
}

/// Validates `data` against `schema`.
///
/// `None` stands for an absent value, which only passes optional schemas.
/// The data is only read, never modified.
pub fn validate_native(data: Option<&Value>, schema: &NativeSchema) -> Result<(), SchemaViolation> {
    check(data, schema, "$", Scalars::Strict)
}

/// Validates text-form data such as a query string against `schema`.
///
/// Behaves like [`validate_native`], except that a string also satisfies a
/// `number`, `integer` or `boolean` schema (or a non-string literal) when it
/// parses as one. `"10"` passes `number`; `"ten"` does not.
pub fn validate_text_form(
    data: Option<&Value>,
    schema: &NativeSchema,
) -> Result<(), SchemaViolation> {
    check(data, schema, "$", Scalars::FromText)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scalars {
    Strict,
    FromText,
}

fn text_is_number(text: &str) -> bool {
    text.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

fn text_is_integer(text: &str) -> bool {
    let text = text.trim();
    text.parse::<i64>().is_ok() || text.parse::<u64>().is_ok()
}

fn text_is_boolean(text: &str) -> bool {
    let text = text.trim();
    text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false")
}

fn check(
    data: Option<&Value>,
    schema: &NativeSchema,
    at: &str,
    scalars: Scalars,
) -> Result<(), SchemaViolation> {
    let Some(value) = data else {
        return if schema.required {
            Err(SchemaViolation::new(at, "is required"))
        } else {
            Ok(())
        };
    };

    let text = value.as_str().filter(|_| scalars == Scalars::FromText);

    match &schema.kind {
        SchemaKind::Any => Ok(()),
        SchemaKind::String => expect(value.is_string(), at, "must be a string"),
        SchemaKind::Number => expect(
            value.is_number() || text.is_some_and(text_is_number),
            at,
            "must be a number",
        ),
        SchemaKind::Integer => expect(
            value.is_i64() || value.is_u64() || text.is_some_and(text_is_integer),
            at,
            "must be an integer",
        ),
        SchemaKind::Boolean => expect(
            value.is_boolean() || text.is_some_and(text_is_boolean),
            at,
            "must be a boolean",
        ),
        SchemaKind::Literal(expected) => {
            let matches_text = !expected.is_string()
                && text.is_some_and(|text| text.trim() == expected.to_string());
            expect(value == expected || matches_text, at, format!("must equal {expected}"))
        }
        SchemaKind::Ordered(items) => {
            let Value::Array(values) = value else {
                return Err(SchemaViolation::new(at, "must be an array"));
            };
            if values.len() > items.len() {
                return Err(SchemaViolation::new(
                    at,
                    format!("must have at most {} item(s)", items.len()),
                ));
            }
            for (index, item) in items.iter().enumerate() {
                check(values.get(index), item, &format!("{at}[{index}]"), scalars)?;
            }
            Ok(())
        }
        SchemaKind::List(item) => {
            let Value::Array(values) = value else {
                return Err(SchemaViolation::new(at, "must be an array"));
            };
            for (index, entry) in values.iter().enumerate() {
                check(Some(entry), item, &format!("{at}[{index}]"), scalars)?;
            }
            Ok(())
        }
        SchemaKind::Object {
            fields,
            allow_unknown,
        } => {
            let Value::Object(map) = value else {
                return Err(SchemaViolation::new(at, "must be an object"));
            };
            if !allow_unknown {
                if let Some(unknown) = map.keys().find(|key| !fields.contains_key(*key)) {
                    return Err(SchemaViolation::new(&format!("{at}.{unknown}"), "is not allowed"));
                }
            }
            for (key, field) in fields {
                check(map.get(key), field, &format!("{at}.{key}"), scalars)?;
            }
            Ok(())
        }
    }
}

fn expect(ok: bool, at: &str, message: impl Into<String>) -> Result<(), SchemaViolation> {
    if ok {
        Ok(())
    } else {
        Err(SchemaViolation::new(at, message))
    }
}
