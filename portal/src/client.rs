//! The client: instance configuration plus an injected transport.
//!
//! [`Client::build_request_options`] turns a resolved path, a payload and a
//! per-call configuration layer into a [`RequestDescriptor`].
//! [`Client::request`] sends it and applies the HTTP error policy.

use std::sync::Arc;

use http::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use tracing::{Span, debug, instrument, warn};

use crate::auth::{AuthLocation, Authentication};
use crate::config::{ClientConfig, OnHttpError, RequestConfig, parse_header};
use crate::error::{ConfigError, PortalError, TransportError};
use crate::method::RestMethod;
use crate::payload::Payload;
use crate::query::{Query, merge_query};
use crate::resource::ResourceBuilder;
use crate::response::Response;
use crate::route::{Route, RouteSpec};
use crate::transport::{RequestDescriptor, ReqwestTransport, Transport};

const APPLICATION_JSON: &str = "application/json";

/// A configured client that route functions are generated from.
///
/// Cloning is cheap: the transport and configuration are shared.
///
/// ## Examples
///
/// ```rust,no_run
/// use portal::{CallInput, Client, ClientConfig, RouteSpec};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::with_reqwest(ClientConfig::new("http://localhost:9200")?)?;
/// let health = client.route(RouteSpec::new("/_cluster/health"))?;
///
/// let response = health.call(CallInput::new()).await?;
/// println!("{:?}", response.body);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl Client {
    /// Creates a client over `transport`.
    pub fn new(transport: impl Transport + 'static, config: ClientConfig) -> Self {
        Self::with_shared_transport(Arc::new(transport), config)
    }

    /// Creates a client over a transport shared with other clients.
    pub fn with_shared_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    /// Creates a client over a fresh [`ReqwestTransport`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_reqwest(config: ClientConfig) -> Result<Self, TransportError> {
        Ok(Self::new(ReqwestTransport::new()?, config))
    }

    /// The instance configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Generates a route function.
    ///
    /// ## Errors
    ///
    /// Returns an error for an invalid path template, an unsupported schema
    /// shorthand or an invalid route header.
    pub fn route(&self, spec: RouteSpec) -> Result<Route, ConfigError> {
        Route::new(self.clone(), spec)
    }

    /// Starts a CRUD resource rooted at `base`.
    pub fn resource(&self, base: impl Into<String>) -> ResourceBuilder {
        ResourceBuilder::new(self.clone(), base)
    }

    /// Builds the transport request for one call.
    ///
    /// `options` is the highest-precedence layer; it is merged over the
    /// instance configuration and the engine defaults. Credentials are
    /// injected before the payload is serialized.
    ///
    /// ## Errors
    ///
    /// Returns an error if no base URL is configured or an injected header
    /// is invalid.
    pub fn build_request_options(
        &self,
        method: RestMethod,
        path: &str,
        payload: Option<Payload>,
        options: &RequestConfig,
    ) -> Result<RequestDescriptor, ConfigError> {
        let effective = options.merged_over(&self.config.as_layer()).resolve()?;

        let mut headers = effective.headers;
        let mut url = path.to_string();
        let mut payload = payload;

        if let Some(spec) = effective
            .authentication
            .as_ref()
            .and_then(Authentication::auth_spec)
        {
            match spec.target {
                AuthLocation::Header => {
                    let (name, value) = parse_header(&spec.key, &spec.value)?;
                    headers.insert(name, value);
                }
                AuthLocation::Payload => {
                    let target = payload
                        .get_or_insert_with(|| Payload::Structured(Value::Object(Map::new())));
                    match target.as_object_mut() {
                        Some(map) => {
                            map.insert(spec.key, Value::String(spec.value));
                        }
                        None => {
                            warn!(key = %spec.key, "Payload is not an object, credential not injected");
                        }
                    }
                }
                AuthLocation::Query => {
                    url = merge_query(&url, &Query::new().with(spec.key, spec.value));
                }
            }
        }

        let json = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == APPLICATION_JSON);

        let descriptor = RequestDescriptor {
            method,
            base_url: effective.base_url,
            url,
            headers,
            body: payload.map(|payload| payload.into_body(json)),
            json,
            timeout_ms: u64::try_from(effective.timeout.as_millis()).unwrap_or(u64::MAX),
            retries: effective.retries,
            throw_on_http_error: effective.on_http_error != OnHttpError::Resolve,
        };
        debug!(
            method = %descriptor.method,
            url = %descriptor.url,
            json = descriptor.json,
            timeout_ms = descriptor.timeout_ms,
            "Built request descriptor"
        );
        Ok(descriptor)
    }

    /// Builds, sends and transforms one request.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error from
    /// [`build_request_options`](Self::build_request_options), any transport
    /// failure, or [`TransportError::HttpStatus`] for a non-success status
    /// when the HTTP error policy is `reject`.
    #[instrument(
        name = "portal_request",
        skip_all,
        fields(
            http.method = %method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn request(
        &self,
        method: RestMethod,
        path: &str,
        payload: Option<Payload>,
        options: &RequestConfig,
    ) -> Result<Response, PortalError> {
        let descriptor = self.build_request_options(method, path, payload, options)?;
        Span::current().record("http.url", descriptor.full_url().as_str());
        let throw_on_http_error = descriptor.throw_on_http_error;

        let raw = match self.transport.send(descriptor).await {
            Ok(raw) => raw,
            Err(err) => {
                Span::current().record("otel.status_code", "ERROR");
                return Err(err.into());
            }
        };

        let response = Response::from_raw(raw);
        if let Some(code) = response.status.code {
            Span::current().record("http.status_code", code);
        }

        if response.is_success() {
            Span::current().record("otel.status_code", "OK");
            return Ok(response);
        }

        let otel_status = if response.status.code.is_some_and(|code| code >= 500) {
            "ERROR"
        } else {
            "UNSET"
        };
        Span::current().record("otel.status_code", otel_status);

        if throw_on_http_error {
            return Err(TransportError::http_status(response).into());
        }
        debug!(status = ?response.status.code, "Resolving non-success status");
        Ok(response)
    }
}
