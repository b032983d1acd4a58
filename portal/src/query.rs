//! Ordered query maps and merging into paths.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;
use url::form_urlencoded;

/// An insertion-ordered query string.
///
/// Each key keeps its position from the first time it was inserted; repeated
/// values for one key serialize as repeated pairs.
///
/// ## Examples
///
/// ```rust
/// use portal::Query;
///
/// let query = Query::new().with("size", "10").with("q", "title:rust");
/// assert_eq!(query.to_query_string(), "size=10&q=title%3Arust");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(IndexMap<String, Vec<String>>);

impl Query {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` query string.
    pub fn parse(input: &str) -> Self {
        let mut query = Self::new();
        for (key, value) in form_urlencoded::parse(input.as_bytes()) {
            query.append(key.into_owned(), value.into_owned());
        }
        query
    }

    /// Sets `key` to a single value, replacing earlier values in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), vec![value.into()]);
    }

    /// Adds another value for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    /// Every value for `key`.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the query has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over keys and their values in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Overlays `other` on top of `self`.
    ///
    /// Keys present in both take `other`'s values but keep their position
    /// in `self`; new keys are appended in `other`'s order.
    pub fn overlay(&mut self, other: &Query) {
        for (key, values) in &other.0 {
            self.0.insert(key.clone(), values.clone());
        }
    }

    /// Serializes as `application/x-www-form-urlencoded`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.0 {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    /// The query as JSON for validation.
    ///
    /// Single-valued keys become strings, repeated keys become arrays.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(key, values)| {
                let value = match values.as_slice() {
                    [single] => Value::String(single.clone()),
                    many => Value::Array(many.iter().cloned().map(Value::String).collect()),
                };
                (key.clone(), value)
            })
            .collect();
        Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Self::new();
        for (key, value) in iter {
            query.append(key, value);
        }
        query
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Query {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Merges `supplied` into the query string embedded in `path`.
///
/// Supplied keys win on collision. An empty `supplied` returns `path`
/// unchanged, so the output is byte-identical for identical input.
///
/// Otherwise the embedded query is decoded and re-encoded together with the
/// supplied pairs as `application/x-www-form-urlencoded`, so `%20` in the
/// template comes out as `+`. The decoded pairs are the same.
///
/// ```rust
/// use portal::{merge_query, Query};
///
/// let merged = merge_query("/x?b=2", &Query::from([("a", "1")]));
/// assert_eq!(merged, "/x?b=2&a=1");
/// ```
pub fn merge_query(path: &str, supplied: &Query) -> String {
    if supplied.is_empty() {
        return path.to_string();
    }

    let (base, mut query) = match path.split_once('?') {
        Some((base, embedded)) => (base, Query::parse(embedded)),
        None => (path, Query::new()),
    };
    query.overlay(supplied);

    let merged = format!("{base}?{}", query.to_query_string());
    debug!(path, merged = %merged, "Merged query string");
    merged
}
