//! HTTP verbs for route specifications.

use strum::{Display, EnumIter, EnumString};

/// HTTP methods a route can be declared with.
///
/// Parsing is case-insensitive so route verbs can be written the way the
/// API documentation spells them.
///
/// ## Examples
///
/// ```rust
/// use portal::RestMethod;
///
/// let parsed: RestMethod = "put".parse().unwrap();
/// assert_eq!(parsed, RestMethod::Put);
/// assert_eq!(parsed.to_string(), "PUT");
/// assert!(parsed.is_idempotent());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RestMethod {
    /// HTTP GET - Retrieve a resource.
    #[default]
    Get,
    /// HTTP POST - Create a resource or trigger an action.
    Post,
    /// HTTP PUT - Replace a resource entirely.
    Put,
    /// HTTP PATCH - Partially update a resource.
    Patch,
    /// HTTP DELETE - Remove a resource.
    Delete,
    /// HTTP HEAD - Retrieve headers only.
    Head,
    /// HTTP OPTIONS - Query supported methods.
    Options,
}

impl RestMethod {
    /// Returns `true` if this method is idempotent.
    ///
    /// Idempotent methods can be called multiple times with the same
    /// effect as calling once. POST and PATCH are not idempotent.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Self::Post | Self::Patch)
    }

    /// Converts to the equivalent `http::Method`.
    pub fn to_http(self) -> http::Method {
        match self {
            Self::Get => http::Method::GET,
            Self::Post => http::Method::POST,
            Self::Put => http::Method::PUT,
            Self::Patch => http::Method::PATCH,
            Self::Delete => http::Method::DELETE,
            Self::Head => http::Method::HEAD,
            Self::Options => http::Method::OPTIONS,
        }
    }
}

impl From<RestMethod> for http::Method {
    fn from(method: RestMethod) -> Self {
        method.to_http()
    }
}
