//! Path templates with `:name:` placeholders.
//!
//! Placeholders are recognised only before the first `?`; anything after it
//! is an embedded query string that is carried through resolution verbatim.
//! A colon that does not open a well-formed placeholder stays literal, so
//! `/time/10:30` has no placeholders.

use std::fmt;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConfigError, PathError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed path template.
///
/// ## Examples
///
/// ```rust
/// use portal::{PathArgs, PathTemplate};
/// use serde_json::json;
///
/// let template = PathTemplate::parse("/:index:/_doc/:id:").unwrap();
/// assert_eq!(template.placeholders(), vec!["index", "id"]);
///
/// let path = template
///     .resolve(&PathArgs::positional([json!("books"), json!(7)]))
///     .unwrap();
/// assert_eq!(path, "/books/_doc/7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
    query: Option<String>,
}

impl PathTemplate {
    /// Parses a template, rejecting duplicate placeholder names.
    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        let (path, query) = match template.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (template, None),
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = path;

        while let Some(open) = rest.find(':') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find(':') {
                Some(close) if is_placeholder_name(&after[..close]) => {
                    let name = &after[..close];
                    if segments
                        .iter()
                        .any(|s| matches!(s, Segment::Placeholder(n) if n == name))
                    {
                        return Err(ConfigError::invalid_path(format!(
                            "duplicate placeholder :{name}: in {template}"
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name.to_string()));
                    rest = &after[close + 1..];
                }
                _ => {
                    literal.push(':');
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
            query,
        })
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Number of placeholders.
    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Placeholder(_)))
            .count()
    }

    /// Binds `args` into the template.
    ///
    /// Every placeholder must receive exactly one scalar value. Values are
    /// written as-is, without percent-encoding.
    pub fn resolve(&self, args: &PathArgs) -> Result<String, PathError> {
        let placeholders = self.placeholders();
        let values: Vec<&Value> = match args {
            PathArgs::None => Vec::new(),
            PathArgs::Positional(values) => values.iter().collect(),
            PathArgs::Named(map) => {
                let unknown = map.keys().any(|key| !placeholders.contains(&key.as_str()));
                let bound: Vec<&Value> = placeholders
                    .iter()
                    .filter_map(|name| map.get(*name))
                    .collect();
                if unknown || bound.len() != placeholders.len() {
                    return Err(self.arity(map.len(), |name| !map.contains_key(name)));
                }
                bound
            }
        };

        if values.len() != placeholders.len() {
            let supplied = values.len();
            return Err(self.arity(supplied, |name| {
                placeholders
                    .iter()
                    .position(|p| *p == name)
                    .is_some_and(|index| index >= supplied)
            }));
        }

        let mut path = String::new();
        let mut values = values.into_iter();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Placeholder(name) => {
                    // counts checked above
                    let Some(value) = values.next() else {
                        return Err(self.arity(0, |_| true));
                    };
                    path.push_str(&scalar(name, value)?);
                }
            }
        }
        if let Some(query) = &self.query {
            path.push('?');
            path.push_str(query);
        }

        debug!(template = %self.raw, path = %path, "Resolved path");
        Ok(path)
    }

    fn arity(&self, supplied: usize, unresolved: impl Fn(&str) -> bool) -> PathError {
        let placeholders = self.placeholders();
        PathError::Arity {
            template: self.raw.clone(),
            expected: placeholders.len(),
            supplied,
            unresolved: placeholders
                .into_iter()
                .filter(|name| unresolved(name))
                .map(str::to_string)
                .collect(),
        }
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn scalar(placeholder: &str, value: &Value) -> Result<String, PathError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(PathError::UnsupportedArgument {
            placeholder: placeholder.to_string(),
            kind: match other {
                Value::Null => "null",
                Value::Array(_) => "array",
                _ => "object",
            },
        }),
    }
}

/// Arguments bound into a [`PathTemplate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PathArgs {
    /// No arguments.
    #[default]
    None,
    /// Values consumed left to right against placeholders.
    Positional(Vec<Value>),
    /// Values matched to placeholders by name.
    Named(Map<String, Value>),
}

impl PathArgs {
    /// Positional arguments.
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self::Positional(values.into_iter().collect())
    }

    /// Named arguments.
    pub fn named<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Named(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Number of supplied arguments.
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Positional(values) => values.len(),
            Self::Named(map) => map.len(),
        }
    }

    /// Whether no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The arguments as JSON for parameter validation.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::None => None,
            Self::Positional(values) => Some(Value::Array(values.clone())),
            Self::Named(map) => Some(Value::Object(map.clone())),
        }
    }
}

impl From<Vec<Value>> for PathArgs {
    fn from(values: Vec<Value>) -> Self {
        Self::Positional(values)
    }
}

impl From<Map<String, Value>> for PathArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self::Named(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholders_in_order() {
        let template = PathTemplate::parse("/a/:x:/b/:y:").unwrap();
        assert_eq!(template.placeholders(), vec!["x", "y"]);
        assert_eq!(template.placeholder_count(), 2);
    }

    #[test]
    fn test_no_placeholders() {
        let template = PathTemplate::parse("/_cat/indices").unwrap();
        assert_eq!(template.placeholder_count(), 0);
        assert_eq!(template.resolve(&PathArgs::None).unwrap(), "/_cat/indices");
    }

    #[test]
    fn test_stray_colons_are_literal() {
        let template = PathTemplate::parse("/time/10:30").unwrap();
        assert_eq!(template.placeholder_count(), 0);
        assert_eq!(template.resolve(&PathArgs::None).unwrap(), "/time/10:30");

        let template = PathTemplate::parse("/a::b/:id:").unwrap();
        assert_eq!(template.placeholders(), vec!["id"]);
        assert_eq!(
            template.resolve(&PathArgs::positional([json!(1)])).unwrap(),
            "/a::b/1"
        );
    }

    #[test]
    fn test_duplicate_placeholder_is_rejected() {
        let err = PathTemplate::parse("/:id:/x/:id:").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPathTemplate { .. }));
    }

    #[test]
    fn test_placeholders_after_query_are_ignored() {
        let template = PathTemplate::parse("/search?q=:term:").unwrap();
        assert_eq!(template.placeholder_count(), 0);
        assert_eq!(
            template.resolve(&PathArgs::None).unwrap(),
            "/search?q=:term:"
        );
    }

    #[test]
    fn test_positional_arity() {
        let template = PathTemplate::parse("/a/:x:/b/:y:").unwrap();

        assert_eq!(
            template
                .resolve(&PathArgs::positional([json!("1"), json!(2)]))
                .unwrap(),
            "/a/1/b/2"
        );

        let err = template
            .resolve(&PathArgs::positional([json!("1")]))
            .unwrap_err();
        assert_eq!(
            err,
            PathError::Arity {
                template: "/a/:x:/b/:y:".to_string(),
                expected: 2,
                supplied: 1,
                unresolved: vec!["y".to_string()],
            }
        );

        let err = template
            .resolve(&PathArgs::positional([json!(1), json!(2), json!(3)]))
            .unwrap_err();
        assert!(matches!(err, PathError::Arity { supplied: 3, .. }));
    }

    #[test]
    fn test_named_binding_is_order_independent() {
        let template = PathTemplate::parse("/items/:id:/parts/:part:").unwrap();
        let path = template
            .resolve(&PathArgs::named([("part", json!("wheel")), ("id", json!(7))]))
            .unwrap();
        assert_eq!(path, "/items/7/parts/wheel");
    }

    #[test]
    fn test_named_unknown_key_is_arity_error() {
        let template = PathTemplate::parse("/items/:id:").unwrap();
        let err = template
            .resolve(&PathArgs::named([("id", json!(7)), ("extra", json!(1))]))
            .unwrap_err();
        assert!(matches!(err, PathError::Arity { expected: 1, supplied: 2, .. }));

        let err = template
            .resolve(&PathArgs::named([("other", json!(7))]))
            .unwrap_err();
        assert!(
            matches!(err, PathError::Arity { unresolved, .. } if unresolved == vec!["id".to_string()])
        );
    }

    #[test]
    fn test_scalar_coercion() {
        let template = PathTemplate::parse("/:a:/:b:/:c:").unwrap();
        let path = template
            .resolve(&PathArgs::positional([json!("s"), json!(1.5), json!(true)]))
            .unwrap();
        assert_eq!(path, "/s/1.5/true");
    }

    #[test]
    fn test_non_scalar_argument_is_rejected() {
        let template = PathTemplate::parse("/items/:id:").unwrap();
        let err = template
            .resolve(&PathArgs::positional([json!({ "id": 1 })]))
            .unwrap_err();
        assert_eq!(
            err,
            PathError::UnsupportedArgument {
                placeholder: "id".to_string(),
                kind: "object",
            }
        );
    }

    #[test]
    fn test_values_are_not_encoded() {
        let template = PathTemplate::parse("/files/:name:").unwrap();
        let path = template
            .resolve(&PathArgs::positional([json!("a b/c")]))
            .unwrap();
        assert_eq!(path, "/files/a b/c");
    }

    #[test]
    fn test_embedded_query_is_kept() {
        let template = PathTemplate::parse("/items/:id:?pretty=true").unwrap();
        let path = template
            .resolve(&PathArgs::positional([json!(3)]))
            .unwrap();
        assert_eq!(path, "/items/3?pretty=true");
    }

    #[test]
    fn test_to_value() {
        assert_eq!(PathArgs::None.to_value(), None);
        assert_eq!(
            PathArgs::positional([json!(1)]).to_value(),
            Some(json!([1]))
        );
        assert_eq!(
            PathArgs::named([("id", json!(1))]).to_value(),
            Some(json!({ "id": 1 }))
        );
    }
}
