//! Client, route, and resource configuration errors.

use thiserror::Error;

/// Errors in client, route, or resource configuration.
///
/// These errors occur while building a client or generating route
/// functions, typically indicating programmer errors or invalid
/// configuration documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A required configuration field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Path template contains invalid placeholder syntax.
    #[error("Invalid path template: {message}")]
    InvalidPathTemplate {
        /// Description of the path template error.
        message: String,
    },

    /// The authentication `type` tag is not one the engine knows.
    #[error("Unsupported authentication type: {tag}")]
    UnsupportedAuthentication {
        /// The rejected tag.
        tag: String,
    },

    /// A route verb is not a known HTTP method.
    #[error("Unsupported HTTP method: {method}")]
    UnsupportedMethod {
        /// The rejected verb.
        method: String,
    },

    /// A shorthand schema names a primitive or modifier that does not exist.
    #[error("Unsupported schema shorthand: {name}")]
    UnsupportedSchema {
        /// The rejected primitive name or modifier.
        name: String,
    },

    /// Header name or value cannot be used in an HTTP request.
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader {
        /// The header name as supplied.
        name: String,
        /// Why the header was rejected.
        reason: String,
    },

    /// A resource was asked to enable a route it does not define.
    #[error("Unknown resource route: {name}")]
    UnknownRoute {
        /// The requested route name.
        name: String,
    },

    /// Two resource routes were registered under the same name.
    #[error("Duplicate route name: {name}")]
    DuplicateRoute {
        /// The duplicate route name.
        name: String,
    },

    /// A timeout is negative, not finite, or too large.
    #[error("Invalid timeout: {seconds} seconds")]
    InvalidTimeout {
        /// The rejected value in seconds.
        seconds: f64,
    },

    /// An environment variable holding a credential is not set.
    #[error("Missing environment variable: {var}")]
    MissingEnv {
        /// The variable name.
        var: String,
    },

    /// A configuration document could not be parsed.
    #[error("Failed to parse {format} configuration: {message}")]
    Parse {
        /// Document format (`json` or `yaml`).
        format: &'static str,
        /// Parser error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates a missing field error.
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Creates an invalid path template error.
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPathTemplate {
            message: message.into(),
        }
    }

    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field() {
        let err = ConfigError::missing_field("base_url");
        assert_eq!(err.to_string(), "Missing required field: base_url");
    }

    #[test]
    fn test_invalid_url() {
        let url_err = url::Url::parse("not-a-url").unwrap_err();
        let err = ConfigError::InvalidUrl(url_err);
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_invalid_path_template() {
        let err = ConfigError::invalid_path("duplicate placeholder :id:");
        assert!(err.to_string().contains("Invalid path template"));
    }

    #[test]
    fn test_unsupported_authentication() {
        let err = ConfigError::UnsupportedAuthentication {
            tag: "token".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported authentication type: token");
    }

    #[test]
    fn test_duplicate_route() {
        let err = ConfigError::DuplicateRoute {
            name: "set".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate route name: set");
    }
}
