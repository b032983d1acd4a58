//! Route specifications and the route functions generated from them.
//!
//! A [`RouteSpec`] is compiled once by [`Client::route`]: the path template
//! is parsed, schema shorthand is translated and route headers are
//! validated. Each [`Route::call`] then validates the input, resolves the
//! path, merges the query and hands off to [`Client::request`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{Span, instrument};

use crate::client::Client;
use crate::config::RequestConfig;
use crate::error::{ConfigError, PortalError, ValidationLabel};
use crate::method::RestMethod;
use crate::path::{PathArgs, PathTemplate};
use crate::payload::Payload;
use crate::query::{Query, merge_query};
use crate::response::Response;
use crate::schema::{CompiledSpec, ValidationSpec, ensure_valid};

const APPLICATION_JSON: &str = "application/json";

/// Declarative description of one endpoint.
///
/// ## Examples
///
/// ```rust
/// use portal::{RestMethod, RouteSpec, Shorthand};
///
/// let add_document = RouteSpec::new("/:index:/_doc/:id:")
///     .method(RestMethod::Put)
///     .params(Shorthand::ordered(["string".into(), "string".into()]))
///     .body(Shorthand::keyed([("title", Shorthand::from("string"))]));
/// assert_eq!(add_document.path(), "/:index:/_doc/:id:");
/// ```
#[derive(Debug, Clone)]
pub struct RouteSpec {
    path: String,
    method: RestMethod,
    params: Option<ValidationSpec>,
    body: Option<ValidationSpec>,
    query: Option<ValidationSpec>,
    content_type: String,
    accept: String,
    headers: IndexMap<String, String>,
}

impl RouteSpec {
    /// A `GET` route for `path` that sends and accepts JSON.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: RestMethod::Get,
            params: None,
            body: None,
            query: None,
            content_type: APPLICATION_JSON.to_string(),
            accept: APPLICATION_JSON.to_string(),
            headers: IndexMap::new(),
        }
    }

    /// Sets the verb.
    pub fn method(mut self, method: RestMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the verb from text, case-insensitively.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::UnsupportedMethod`] for an unknown verb.
    pub fn verb(self, verb: &str) -> Result<Self, ConfigError> {
        let method = verb
            .trim()
            .parse::<RestMethod>()
            .map_err(|_| ConfigError::UnsupportedMethod {
                method: verb.to_string(),
            })?;
        Ok(self.method(method))
    }

    /// Spec for the path arguments.
    pub fn params(mut self, spec: impl Into<ValidationSpec>) -> Self {
        self.params = Some(spec.into());
        self
    }

    /// Spec for the payload.
    pub fn body(mut self, spec: impl Into<ValidationSpec>) -> Self {
        self.body = Some(spec.into());
        self
    }

    /// Spec for the caller-supplied query.
    pub fn query(mut self, spec: impl Into<ValidationSpec>) -> Self {
        self.query = Some(spec.into());
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Sets the `Accept` header.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }

    /// Adds a route header. Route headers override `Accept` and
    /// `Content-Type` when they share a name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// The path template as written.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The verb.
    pub fn http_method(&self) -> RestMethod {
        self.method
    }

    pub(crate) fn prefixed(mut self, base: &str) -> Self {
        self.path = format!("{base}{}", self.path);
        self
    }

    fn compile(self) -> Result<CompiledRoute, ConfigError> {
        let template = PathTemplate::parse(&self.path)?;
        let compile = |spec: Option<ValidationSpec>| spec.map(|spec| spec.compile()).transpose();

        let mut defaults = RequestConfig::new()
            .header("Accept", &self.accept)?
            .header("Content-Type", &self.content_type)?;
        for (name, value) in &self.headers {
            defaults = defaults.header(name, value)?;
        }

        Ok(CompiledRoute {
            template,
            method: self.method,
            params: compile(self.params)?,
            body: compile(self.body)?,
            query: compile(self.query)?,
            defaults,
        })
    }
}

#[derive(Debug)]
struct CompiledRoute {
    template: PathTemplate,
    method: RestMethod,
    params: Option<CompiledSpec>,
    body: Option<CompiledSpec>,
    query: Option<CompiledSpec>,
    defaults: RequestConfig,
}

/// Everything a caller supplies to one route call.
///
/// ## Examples
///
/// ```rust
/// use portal::{CallInput, Query};
/// use serde_json::json;
///
/// let input = CallInput::new()
///     .arg("index", json!("books"))
///     .with_query("refresh", "true")
///     .payload(json!({ "title": "Dune" }))
///     .header("X-Opaque-Id", "import-42");
/// assert_eq!(input.query, Some(Query::from([("refresh", "true")])));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallInput {
    /// Values bound into the path template.
    pub path_args: PathArgs,
    /// Request body.
    pub payload: Option<Payload>,
    /// Query merged into the resolved path.
    pub query: Option<Query>,
    /// Headers for this call only.
    pub headers: IndexMap<String, String>,
    /// Configuration overriding every other layer.
    pub overrides: RequestConfig,
}

impl CallInput {
    /// Empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional path arguments.
    pub fn positional(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.path_args = PathArgs::positional(values);
        self
    }

    /// Path arguments in either binding mode.
    pub fn args(mut self, args: impl Into<PathArgs>) -> Self {
        self.path_args = args.into();
        self
    }

    /// Adds one named path argument. Replaces positional arguments.
    pub fn arg(mut self, name: impl Into<String>, value: Value) -> Self {
        let name: String = name.into();
        match &mut self.path_args {
            PathArgs::Named(map) => {
                map.insert(name, value);
            }
            other => *other = PathArgs::named([(name, value)]),
        }
        self
    }

    /// Sets the payload.
    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Sets the query.
    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    /// Adds one query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.get_or_insert_with(Query::new).insert(key, value);
        self
    }

    /// Adds a header for this call.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the configuration overrides.
    pub fn overrides(mut self, overrides: RequestConfig) -> Self {
        self.overrides = overrides;
        self
    }
}

/// A callable route function.
///
/// Calls share nothing mutable and may run concurrently.
#[derive(Debug, Clone)]
pub struct Route {
    compiled: Arc<CompiledRoute>,
    client: Client,
}

impl Route {
    pub(crate) fn new(client: Client, spec: RouteSpec) -> Result<Self, ConfigError> {
        Ok(Self {
            compiled: Arc::new(spec.compile()?),
            client,
        })
    }

    /// The route's path template.
    pub fn template(&self) -> &PathTemplate {
        &self.compiled.template
    }

    /// The route's verb.
    pub fn method(&self) -> RestMethod {
        self.compiled.method
    }

    /// Calls the route.
    ///
    /// Parameters, payload and query are validated in that order; the first
    /// failure aborts the call before the path is resolved or anything is
    /// sent.
    ///
    /// ## Errors
    ///
    /// - [`PortalError::Validation`] when an input part fails its spec
    /// - [`PortalError::Path`] when the path arguments do not fit the template
    /// - [`PortalError::Config`] for an invalid call header or missing base URL
    /// - [`PortalError::Transport`] for transport failures and rejected statuses
    #[instrument(
        name = "portal_route",
        skip_all,
        fields(
            route = %self.compiled.template,
            http.method = %self.compiled.method,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub async fn call(&self, input: CallInput) -> Result<Response, PortalError> {
        let route = &self.compiled;
        let CallInput {
            path_args,
            payload,
            query,
            headers,
            overrides,
        } = input;

        ensure_valid(
            route.params.as_ref(),
            path_args.to_value().as_ref(),
            ValidationLabel::Parameters,
        )?;
        ensure_valid(
            route.body.as_ref(),
            payload.as_ref().map(Payload::as_value).as_deref(),
            ValidationLabel::Payload,
        )?;
        ensure_valid(
            route.query.as_ref(),
            query.as_ref().map(Query::to_value).as_ref(),
            ValidationLabel::QueryString,
        )?;

        let mut path = route.template.resolve(&path_args)?;
        if let Some(query) = &query {
            path = merge_query(&path, query);
        }

        let mut call_headers = RequestConfig::new();
        for (name, value) in &headers {
            call_headers = call_headers.header(name, value)?;
        }
        let options = overrides.merged_over(&call_headers.merged_over(&route.defaults));

        let response = self
            .client
            .request(route.method, &path, payload, &options)
            .await?;
        if let Some(code) = response.status.code {
            Span::current().record("http.status_code", code);
        }
        Ok(response)
    }
}
