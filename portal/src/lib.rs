//! Declarative route functions over an injected HTTP transport.
//!
//! The `portal` crate turns a compact endpoint description into a callable
//! route function. Each call validates its input, binds path arguments into
//! `:name:` placeholders, merges the query string, layers configuration
//! and credentials, and hands a finished request to a [`Transport`].
//!
//! ## Features
//!
//! - **Route functions**: [`RouteSpec`] in, [`Route`] out, one [`CallInput`] per call
//! - **Schema gateway**: native schemas, custom validators, or string shorthand
//!   such as `"string|notrequired"`
//! - **Layered configuration**: engine defaults < [`ClientConfig`] < route
//!   headers < per-call headers and overrides
//! - **Authentication**: basic, bearer, or a named key in a header, payload field
//!   or query parameter
//! - **CRUD resources**: `list`, `get`, `edit`, `add`/`set`, `del`/`delete`
//! - **Pluggable transport**: bring your own, or use [`ReqwestTransport`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use portal::{CallInput, Client, ClientConfig, OnHttpError, RestMethod, RouteSpec};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::builder("http://localhost:9200")?
//!     .on_http_error(OnHttpError::Resolve)
//!     .build();
//! let client = Client::with_reqwest(config)?;
//!
//! let create_index = client.route(RouteSpec::new("/:index:").method(RestMethod::Put))?;
//! let response = create_index
//!     .call(CallInput::new().positional([json!("books")]))
//!     .await?;
//! println!("{:?} {:?}", response.status.code, response.body);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod method;
pub mod path;
pub mod payload;
pub mod query;
pub mod resource;
pub mod response;
pub mod route;
pub mod schema;
pub mod transport;

// Re-exports for convenience
pub use auth::{AuthLocation, AuthSpec, Authentication, AuthenticationDocument};
pub use client::Client;
pub use config::{
    ClientConfig, ClientConfigBuilder, ClientConfigDocument, EffectiveConfig, OnHttpError,
    RequestConfig,
};
pub use error::{
    ConfigError, PathError, PortalError, TransportError, ValidationError, ValidationLabel,
};
pub use method::RestMethod;
pub use path::{PathArgs, PathTemplate};
pub use payload::Payload;
pub use query::{Query, merge_query};
pub use resource::{Resource, ResourceBuilder, RouteName};
pub use response::{Response, ResponseBody, Status};
pub use route::{CallInput, Route, RouteSpec};
pub use schema::{
    CompiledSpec, NativeSchema, SchemaKind, Shorthand, ValidationSpec, Validator, ensure_valid,
    transform_schema, validate_native, validate_text_form,
};
pub use transport::{RawResponse, RequestBody, RequestDescriptor, ReqwestTransport, Transport};
