//! Request configuration layers.
//!
//! A request's configuration is assembled from, lowest precedence first:
//!
//! 1. engine defaults ([`RequestConfig::engine_defaults`])
//! 2. the client's [`ClientConfig`]
//! 3. route defaults (`Accept`, `Content-Type`, route headers)
//! 4. per-call headers and overrides
//!
//! Layers are merged field by field with [`RequestConfig::merged_over`];
//! headers merge key by key.

use std::path::Path;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::Display;
use url::Url;

use crate::auth::{Authentication, AuthenticationDocument};
use crate::error::ConfigError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// What a non-success HTTP status does to a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OnHttpError {
    /// Fail the call with [`TransportError::HttpStatus`](crate::TransportError::HttpStatus).
    #[default]
    Reject,
    /// Return the response as a normal result.
    Resolve,
}

/// One layer of request configuration. Unset fields defer to lower layers.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Base URL requests are sent to.
    pub base_url: Option<Url>,
    /// Headers merged key by key with lower layers.
    pub headers: HeaderMap,
    /// Credentials injected into every request.
    pub authentication: Option<Authentication>,
    /// Extra attempts the transport may make.
    pub retries: Option<u32>,
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Reject or resolve on non-success statuses.
    pub on_http_error: Option<OnHttpError>,
}

impl RequestConfig {
    /// An empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lowest layer: no retries, 30 second timeout, reject on HTTP errors.
    pub fn engine_defaults() -> Self {
        Self {
            retries: Some(0),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            on_http_error: Some(OnHttpError::Reject),
            ..Self::default()
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        self.base_url = Some(Url::parse(base_url.as_ref())?);
        Ok(self)
    }

    /// Sets a header, replacing earlier values for the same name.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self, ConfigError> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Sets the credentials.
    ///
    /// ## Errors
    ///
    /// [`ConfigError::InvalidHeader`] when a header-bound credential is not a
    /// legal header.
    pub fn authentication(mut self, authentication: Authentication) -> Result<Self, ConfigError> {
        authentication.validate()?;
        self.authentication = Some(authentication);
        Ok(self)
    }

    /// Sets the retry count.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the HTTP error policy.
    pub fn on_http_error(mut self, policy: OnHttpError) -> Self {
        self.on_http_error = Some(policy);
        self
    }

    /// Merges `self` over `lower`; fields set in `self` win.
    pub fn merged_over(&self, lower: &RequestConfig) -> RequestConfig {
        let mut headers = lower.headers.clone();
        for name in self.headers.keys() {
            headers.remove(name);
            for value in self.headers.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        RequestConfig {
            base_url: self.base_url.clone().or_else(|| lower.base_url.clone()),
            headers,
            authentication: self
                .authentication
                .clone()
                .or_else(|| lower.authentication.clone()),
            retries: self.retries.or(lower.retries),
            timeout: self.timeout.or(lower.timeout),
            on_http_error: self.on_http_error.or(lower.on_http_error),
        }
    }

    /// Fills the remaining gaps from engine defaults.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no layer set a base URL.
    pub fn resolve(&self) -> Result<EffectiveConfig, ConfigError> {
        let merged = self.merged_over(&Self::engine_defaults());
        Ok(EffectiveConfig {
            base_url: merged
                .base_url
                .ok_or_else(|| ConfigError::missing_field("base_url"))?,
            headers: merged.headers,
            authentication: merged.authentication,
            retries: merged.retries.unwrap_or_default(),
            timeout: merged
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            on_http_error: merged.on_http_error.unwrap_or_default(),
        })
    }
}

/// Fully merged configuration for one request.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    /// Base URL.
    pub base_url: Url,
    /// Merged headers.
    pub headers: HeaderMap,
    /// Credentials, if any layer set them.
    pub authentication: Option<Authentication>,
    /// Extra attempts the transport may make.
    pub retries: u32,
    /// Request timeout.
    pub timeout: Duration,
    /// HTTP error policy.
    pub on_http_error: OnHttpError,
}

/// Instance configuration, fixed for a client's lifetime.
///
/// ## Examples
///
/// ```rust
/// use portal::{Authentication, ClientConfig, OnHttpError};
///
/// let config = ClientConfig::builder("http://localhost:9200")
///     .unwrap()
///     .authentication(Authentication::basic("elastic", "changeme"))
///     .unwrap()
///     .on_http_error(OnHttpError::Resolve)
///     .build();
/// assert_eq!(config.base_url.as_str(), "http://localhost:9200/");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every route is resolved against.
    pub base_url: Url,
    /// Headers sent with every request.
    pub headers: HeaderMap,
    /// Credentials for every request.
    pub authentication: Option<Authentication>,
    /// Extra attempts the transport may make.
    pub retries: Option<u32>,
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// HTTP error policy.
    pub on_http_error: Option<OnHttpError>,
}

impl ClientConfig {
    /// Starts a builder for `base_url`.
    ///
    /// ## Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn builder(base_url: impl AsRef<str>) -> Result<ClientConfigBuilder, ConfigError> {
        Ok(ClientConfigBuilder::new(Url::parse(base_url.as_ref())?))
    }

    /// Configuration with only a base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        Ok(Self::builder(base_url)?.build())
    }

    /// Parses a JSON configuration document.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let doc: ClientConfigDocument =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse {
                format: "json",
                message: e.to_string(),
            })?;
        Self::try_from(doc)
    }

    /// Parses a YAML configuration document.
    pub fn from_yaml(input: &str) -> Result<Self, ConfigError> {
        let doc: ClientConfigDocument =
            serde_yaml::from_str(input).map_err(|e| ConfigError::Parse {
                format: "yaml",
                message: e.to_string(),
            })?;
        Self::try_from(doc)
    }

    /// Reads a configuration file, choosing the format by extension.
    ///
    /// `.yaml` and `.yml` are read as YAML, anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let format = if is_yaml { "yaml" } else { "json" };

        let input = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            format,
            message: format!("{}: {e}", path.display()),
        })?;

        if is_yaml {
            Self::from_yaml(&input)
        } else {
            Self::from_json(&input)
        }
    }

    /// This configuration as a merge layer.
    pub fn as_layer(&self) -> RequestConfig {
        RequestConfig {
            base_url: Some(self.base_url.clone()),
            headers: self.headers.clone(),
            authentication: self.authentication.clone(),
            retries: self.retries,
            timeout: self.timeout,
            on_http_error: self.on_http_error,
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    fn new(base_url: Url) -> Self {
        Self {
            config: ClientConfig {
                base_url,
                headers: HeaderMap::new(),
                authentication: None,
                retries: None,
                timeout: None,
                on_http_error: None,
            },
        }
    }

    /// Adds a header sent with every request.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self, ConfigError> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.config.headers.insert(name, value);
        Ok(self)
    }

    /// Sets the credentials.
    ///
    /// ## Errors
    ///
    /// [`ConfigError::InvalidHeader`] when a header-bound credential is not a
    /// legal header.
    pub fn authentication(mut self, authentication: Authentication) -> Result<Self, ConfigError> {
        authentication.validate()?;
        self.config.authentication = Some(authentication);
        Ok(self)
    }

    /// Sets the retry count.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = Some(retries);
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Sets the HTTP error policy.
    pub fn on_http_error(mut self, policy: OnHttpError) -> Self {
        self.config.on_http_error = Some(policy);
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// [`ClientConfig`] as written in JSON or YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfigDocument {
    /// Base URL.
    #[serde(alias = "base_url")]
    pub base_url: Option<String>,
    /// Headers sent with every request.
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// Credentials.
    #[serde(default)]
    pub authentication: Option<AuthenticationDocument>,
    /// Extra attempts the transport may make.
    #[serde(default)]
    pub retries: Option<u32>,
    /// Timeout in seconds; fractions are allowed.
    #[serde(default)]
    pub timeout: Option<f64>,
    /// HTTP error policy.
    #[serde(default, alias = "onError", alias = "on_http_error")]
    pub on_http_error: Option<OnHttpError>,
}

impl TryFrom<ClientConfigDocument> for ClientConfig {
    type Error = ConfigError;

    fn try_from(doc: ClientConfigDocument) -> Result<Self, Self::Error> {
        let base_url = doc
            .base_url
            .ok_or_else(|| ConfigError::missing_field("base_url"))?;
        let mut builder = ClientConfig::builder(base_url)?;
        for (name, value) in &doc.headers {
            builder = builder.header(name, value)?;
        }
        if let Some(auth) = doc.authentication {
            builder = builder.authentication(Authentication::try_from(auth)?)?;
        }
        if let Some(retries) = doc.retries {
            builder = builder.retries(retries);
        }
        if let Some(seconds) = doc.timeout {
            let timeout = Duration::try_from_secs_f64(seconds)
                .map_err(|_| ConfigError::InvalidTimeout { seconds })?;
            builder = builder.timeout(timeout);
        }
        if let Some(policy) = doc.on_http_error {
            builder = builder.on_http_error(policy);
        }
        Ok(builder.build())
    }
}

/// Validates a header name and value.
pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let header_name =
        HeaderName::try_from(name).map_err(|e| ConfigError::invalid_header(name, e))?;
    let header_value =
        HeaderValue::try_from(value).map_err(|e| ConfigError::invalid_header(name, e))?;
    Ok((header_name, header_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthLocation;

    fn layer(header: &str, retries: Option<u32>) -> RequestConfig {
        let mut config = RequestConfig::new().header("x-layer", header).unwrap();
        config.retries = retries;
        config
    }

    #[test]
    fn test_engine_defaults() {
        let effective = RequestConfig::new()
            .base_url("http://localhost:9200")
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(effective.retries, 0);
        assert_eq!(effective.timeout, Duration::from_secs(30));
        assert_eq!(effective.on_http_error, OnHttpError::Reject);
        assert!(effective.headers.is_empty());
        assert!(effective.authentication.is_none());
    }

    #[test]
    fn test_missing_base_url() {
        let err = RequestConfig::new().resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "base_url" }));
    }

    #[test]
    fn test_three_level_precedence() {
        let instance = layer("instance", Some(2));
        let call = layer("call", None);

        let merged = call.merged_over(&instance.merged_over(&RequestConfig::engine_defaults()));
        assert_eq!(merged.headers["x-layer"], "call");
        assert_eq!(merged.retries, Some(2));

        let merged = RequestConfig::new().merged_over(&instance.merged_over(&RequestConfig::engine_defaults()));
        assert_eq!(merged.headers["x-layer"], "instance");

        let merged = RequestConfig::new().merged_over(&RequestConfig::engine_defaults());
        assert_eq!(merged.retries, Some(0));
    }

    #[test]
    fn test_headers_merge_key_by_key_case_insensitively() {
        let lower = RequestConfig::new()
            .header("Accept", "application/json")
            .unwrap()
            .header("X-Keep", "1")
            .unwrap();
        let upper = RequestConfig::new().header("accept", "text/plain").unwrap();

        let merged = upper.merged_over(&lower);
        assert_eq!(merged.headers.len(), 2);
        assert_eq!(merged.headers["accept"], "text/plain");
        assert_eq!(merged.headers["x-keep"], "1");
    }

    #[test]
    fn test_invalid_header() {
        let err = RequestConfig::new().header("bad header", "v").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeader { name, .. } if name == "bad header"));
    }

    #[test]
    fn test_on_http_error_display() {
        assert_eq!(OnHttpError::Reject.to_string(), "reject");
        assert_eq!(OnHttpError::Resolve.to_string(), "resolve");
    }

    #[test]
    fn test_builder_rejects_relative_url() {
        let err = ClientConfig::builder("/not/absolute").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn test_from_json() {
        let config = ClientConfig::from_json(
            r#"{
                "baseUrl": "http://localhost:9200",
                "headers": { "X-Opaque-Id": "portal" },
                "authentication": { "type": "bearer", "authToken": "abc" },
                "timeout": 5,
                "onError": "resolve"
            }"#,
        )
        .unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:9200/");
        assert_eq!(config.headers["x-opaque-id"], "portal");
        assert_eq!(config.authentication, Some(Authentication::bearer("abc")));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.on_http_error, Some(OnHttpError::Resolve));
        assert_eq!(config.retries, None);
    }

    #[test]
    fn test_from_yaml() {
        let config = ClientConfig::from_yaml(
            "baseUrl: https://search.example.com\nretries: 3\nauthentication:\n  type: basic\n  username: u\n  password: p\n",
        )
        .unwrap();
        assert_eq!(config.retries, Some(3));
        assert_eq!(config.authentication, Some(Authentication::basic("u", "p")));
    }

    #[test]
    fn test_document_errors() {
        let err = ClientConfig::from_json(r#"{ "headers": {} }"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "base_url" }));

        let err = ClientConfig::from_json(
            r#"{ "baseUrl": "http://h", "authentication": { "type": "token" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedAuthentication { .. }));

        let err = ClientConfig::from_yaml("baseUrl: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "yaml", .. }));
    }

    #[test]
    fn test_invalid_key_header_rejected_at_setup() {
        let auth = Authentication::key("x api key", "k", AuthLocation::Header);
        let err = ClientConfig::builder("http://h")
            .unwrap()
            .authentication(auth.clone())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeader { .. }));
        assert!(RequestConfig::new().authentication(auth).is_err());

        let err = ClientConfig::from_json(
            r#"{ "baseUrl": "http://h", "authentication": { "type": "key", "name": "x api key", "value": "k" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeader { name, .. } if name == "x api key"));
    }

    #[test]
    fn test_fractional_timeout() {
        let config =
            ClientConfig::from_json(r#"{ "baseUrl": "http://h", "timeout": 0.5 }"#).unwrap();
        assert_eq!(config.timeout, Some(Duration::from_millis(500)));

        let config = ClientConfig::from_yaml("baseUrl: http://h\ntimeout: 2\n").unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(2)));

        let err =
            ClientConfig::from_json(r#"{ "baseUrl": "http://h", "timeout": -1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { seconds } if seconds == -1.0));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = ClientConfig::from_path("/nonexistent/portal.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "yaml", .. }));
    }

    #[test]
    fn test_as_layer_round_trips_fields() {
        let config = ClientConfig::builder("http://h")
            .unwrap()
            .retries(1)
            .build();
        let layer = config.as_layer();
        assert_eq!(layer.base_url.as_ref().map(Url::as_str), Some("http://h/"));
        assert_eq!(layer.retries, Some(1));
    }
}
