//! Top-level portal error type.

use super::{ConfigError, PathError, TransportError, ValidationError};
use thiserror::Error;

/// Top-level error type for every route function and client request.
///
/// This enum aggregates all error categories, enabling unified error handling
/// while preserving the ability to match on specific error types when needed.
///
/// ## Examples
///
/// ```rust,ignore
/// use portal::PortalError;
///
/// fn handle_error(err: PortalError) {
///     match err {
///         PortalError::Validation(e) => eprintln!("{} rejected: {}", e.label(), e.reason()),
///         PortalError::Path(e) => eprintln!("Bad path arguments: {e}"),
///         PortalError::Config(e) => eprintln!("Configuration error: {e}"),
///         PortalError::Transport(e) => eprintln!("Request failed: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum PortalError {
    /// Input rejected by the route's parameter, payload, or query schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Path arguments could not be bound to the path template.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Invalid client, route, or per-call configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transport failure or rejected HTTP status.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl PortalError {
    /// Returns `true` if the error was raised before any network activity.
    pub fn is_before_network(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }

    /// Returns the HTTP status code if the failure carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status_code(),
            _ => None,
        }
    }
}
