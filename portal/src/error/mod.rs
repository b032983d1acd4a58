//! Layered error types for the portal crate.
//!
//! The error hierarchy mirrors where a call can fail:
//! - [`PortalError`] - Top-level error type returned by route functions
//! - [`ValidationError`] - Parameters, payload, or query string rejected by their schema
//! - [`PathError`] - Path arguments do not fit the route's path template
//! - [`ConfigError`] - Client, route, or resource configuration problems
//! - [`TransportError`] - Failures surfaced by the transport or by HTTP status
//!
//! Validation, path, and configuration errors are always raised before the
//! transport is touched.

mod config_error;
mod path_error;
mod portal_error;
mod transport_error;
mod validation_error;

pub use config_error::ConfigError;
pub use path_error::PathError;
pub use portal_error::PortalError;
pub use transport_error::TransportError;
pub use validation_error::{ValidationError, ValidationLabel};
