//! Authentication variants and where their credentials are written.
//!
//! Every variant maps to exactly one target: a header, a payload field, or a
//! query parameter. Basic and bearer credentials always go to the
//! `Authorization` header; key credentials go wherever their
//! [`AuthLocation`] says.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use crate::config::parse_header;
use crate::error::ConfigError;

/// Where a credential is injected into a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLocation {
    /// Request header.
    #[default]
    Header,
    /// Field of a structured object payload.
    Payload,
    /// Query string parameter.
    Query,
}

/// Credentials attached to every request of a client.
///
/// ## Examples
///
/// ```rust
/// use portal::{AuthLocation, Authentication};
///
/// let auth = Authentication::basic("u", "p");
/// let spec = auth.auth_spec().unwrap();
/// assert_eq!(spec.target, AuthLocation::Header);
/// assert_eq!(spec.value, "Basic dTpw");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Authentication {
    /// No credentials.
    #[default]
    None,
    /// HTTP basic authentication.
    Basic {
        /// Account name.
        username: String,
        /// Account password.
        password: String,
    },
    /// Bearer token.
    Bearer {
        /// The token, without the `Bearer ` prefix.
        token: String,
    },
    /// A named key placed in a header, payload field or query parameter.
    Key {
        /// Header, field or parameter name.
        name: String,
        /// The key itself.
        value: String,
        /// Where the key is placed.
        location: AuthLocation,
    },
}

/// A resolved credential: where it goes, under which key, with which value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSpec {
    /// Injection target.
    pub target: AuthLocation,
    /// Header, field or parameter name.
    pub key: String,
    /// Value written under `key`.
    pub value: String,
}

impl Authentication {
    /// Basic credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Named key at `location`.
    pub fn key(name: impl Into<String>, value: impl Into<String>, location: AuthLocation) -> Self {
        Self::Key {
            name: name.into(),
            value: value.into(),
            location,
        }
    }

    /// Bearer token read from an environment variable.
    pub fn bearer_from_env(var: &str) -> Result<Self, ConfigError> {
        Ok(Self::bearer(read_env(var)?))
    }

    /// Basic credentials read from two environment variables.
    pub fn basic_from_env(username_var: &str, password_var: &str) -> Result<Self, ConfigError> {
        Ok(Self::basic(read_env(username_var)?, read_env(password_var)?))
    }

    /// Checks that a header-bound credential forms a legal header.
    ///
    /// Payload and query credentials are always accepted.
    ///
    /// ## Errors
    ///
    /// [`ConfigError::InvalidHeader`] when the header name or value is not
    /// legal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.auth_spec() {
            Some(spec) if spec.target == AuthLocation::Header => {
                parse_header(&spec.key, &spec.value).map(|_| ())
            }
            _ => Ok(()),
        }
    }

    /// The `type` tag used in configuration documents.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic { .. } => "basic",
            Self::Bearer { .. } => "bearer",
            Self::Key { .. } => "key",
        }
    }

    /// Computes where and what to inject, or `None` for no credentials.
    pub fn auth_spec(&self) -> Option<AuthSpec> {
        match self {
            Self::None => None,
            Self::Basic { username, password } => Some(AuthSpec {
                target: AuthLocation::Header,
                key: "Authorization".to_string(),
                value: format!("Basic {}", BASE64.encode(format!("{username}:{password}"))),
            }),
            Self::Bearer { token } => Some(AuthSpec {
                target: AuthLocation::Header,
                key: "Authorization".to_string(),
                value: format!("Bearer {token}"),
            }),
            Self::Key {
                name,
                value,
                location,
            } => Some(AuthSpec {
                target: *location,
                key: name.clone(),
                value: value.clone(),
            }),
        }
    }
}

// Secrets stay out of logs and panics.
impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
            Self::Key { name, location, .. } => f
                .debug_struct("Key")
                .field("name", name)
                .field("value", &"<redacted>")
                .field("location", location)
                .finish(),
        }
    }
}

fn read_env(var: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingEnv {
        var: var.to_string(),
    })
}

/// Authentication as written in a configuration document.
///
/// The `type` tag is kept as free text so unknown tags can be reported as
/// [`ConfigError::UnsupportedAuthentication`] rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationDocument {
    /// Variant tag: `none`, `basic`, `bearer` or `key`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Basic username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Basic password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Bearer token.
    #[serde(default, alias = "authToken", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Key name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Key value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Key location.
    #[serde(default, rename = "in", alias = "location", skip_serializing_if = "Option::is_none")]
    pub location: Option<AuthLocation>,
}

impl TryFrom<AuthenticationDocument> for Authentication {
    type Error = ConfigError;

    fn try_from(doc: AuthenticationDocument) -> Result<Self, Self::Error> {
        let auth = match doc.kind.to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "basic" => Self::Basic {
                username: doc
                    .username
                    .ok_or_else(|| ConfigError::missing_field("authentication.username"))?,
                password: doc
                    .password
                    .ok_or_else(|| ConfigError::missing_field("authentication.password"))?,
            },
            "bearer" => Self::Bearer {
                token: doc
                    .token
                    .ok_or_else(|| ConfigError::missing_field("authentication.token"))?,
            },
            "key" => Self::Key {
                name: doc
                    .name
                    .ok_or_else(|| ConfigError::missing_field("authentication.name"))?,
                value: doc
                    .value
                    .ok_or_else(|| ConfigError::missing_field("authentication.value"))?,
                location: doc.location.unwrap_or_default(),
            },
            _ => return Err(ConfigError::UnsupportedAuthentication { tag: doc.kind }),
        };
        auth.validate()?;
        Ok(auth)
    }
}
