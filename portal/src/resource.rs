//! CRUD resources: a fixed set of named routes under one base path.
//!
//! | name | verb | path |
//! |---|---|---|
//! | `list` | GET | `{base}/` |
//! | `get` | GET | `{base}/:id:` |
//! | `edit` | PUT | `{base}/:id:` |
//! | `add` (alias `set`) | POST | `{base}/` |
//! | `del` (alias `delete`) | DELETE | `{base}/:id:` |

use indexmap::IndexMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::debug;

use crate::client::Client;
use crate::error::ConfigError;
use crate::method::RestMethod;
use crate::route::{Route, RouteSpec};

/// The canonical resource routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RouteName {
    /// List the collection.
    List,
    /// Fetch one item.
    Get,
    /// Replace one item.
    Edit,
    /// Create an item.
    Add,
    /// Delete one item.
    Del,
}

const ALIASES: &[(&str, RouteName)] = &[("set", RouteName::Add), ("delete", RouteName::Del)];

impl RouteName {
    /// Resolves a canonical name or an alias.
    pub fn lookup(name: &str) -> Option<Self> {
        name.parse::<Self>().ok().or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == name)
                .map(|(_, route)| *route)
        })
    }

    /// The alias for this route, if it has one.
    pub fn alias(self) -> Option<&'static str> {
        ALIASES
            .iter()
            .find(|(_, route)| *route == self)
            .map(|(alias, _)| *alias)
    }

    /// The route's verb.
    pub fn method(self) -> RestMethod {
        match self {
            Self::List | Self::Get => RestMethod::Get,
            Self::Edit => RestMethod::Put,
            Self::Add => RestMethod::Post,
            Self::Del => RestMethod::Delete,
        }
    }

    /// The path appended to the resource base.
    pub fn path_suffix(self) -> &'static str {
        match self {
            Self::List | Self::Add => "/",
            Self::Get | Self::Edit | Self::Del => "/:id:",
        }
    }
}

/// Builder for [`Resource`]. Created by [`Client::resource`].
#[derive(Debug)]
pub struct ResourceBuilder {
    client: Client,
    base: String,
    enabled: Option<Vec<String>>,
    extras: Vec<(String, RouteSpec)>,
}

impl ResourceBuilder {
    pub(crate) fn new(client: Client, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
            enabled: None,
            extras: Vec::new(),
        }
    }

    /// Generates only the named routes instead of all five.
    ///
    /// Aliases are accepted (`set` enables `add`).
    pub fn only<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.enabled = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a named route whose path is prefixed with the base path.
    pub fn with_extra(mut self, name: impl Into<String>, spec: RouteSpec) -> Self {
        self.extras.push((name.into(), spec));
        self
    }

    /// Generates the routes.
    ///
    /// ## Errors
    ///
    /// - [`ConfigError::UnknownRoute`] for an enabled name that is not a
    ///   canonical route or alias
    /// - [`ConfigError::DuplicateRoute`] for an extra route that reuses a
    ///   canonical name, an alias or another extra's name
    /// - any error from generating the routes themselves
    pub fn build(self) -> Result<Resource, ConfigError> {
        let base = normalize_base(&self.base);

        let enabled: Vec<RouteName> = match &self.enabled {
            None => RouteName::iter().collect(),
            Some(names) => names
                .iter()
                .map(|name| {
                    RouteName::lookup(name).ok_or_else(|| ConfigError::UnknownRoute {
                        name: name.clone(),
                    })
                })
                .collect::<Result<_, _>>()?,
        };

        let mut routes: IndexMap<RouteName, Route> = IndexMap::new();
        for name in enabled {
            if routes.contains_key(&name) {
                continue;
            }
            let spec = RouteSpec::new(format!("{base}{}", name.path_suffix())).method(name.method());
            routes.insert(name, self.client.route(spec)?);
        }

        let mut extras: IndexMap<String, Route> = IndexMap::new();
        for (name, spec) in self.extras {
            if RouteName::lookup(&name).is_some() || extras.contains_key(&name) {
                return Err(ConfigError::DuplicateRoute { name });
            }
            let route = self.client.route(spec.prefixed(&base))?;
            extras.insert(name, route);
        }

        debug!(
            base = %base,
            routes = routes.len(),
            extras = extras.len(),
            "Generated resource"
        );
        Ok(Resource {
            base,
            routes,
            extras,
        })
    }
}

fn normalize_base(base: &str) -> String {
    let trimmed = base.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

/// A generated set of CRUD routes.
///
/// ## Examples
///
/// ```rust,no_run
/// use portal::{CallInput, Client, ClientConfig};
/// use serde_json::json;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::with_reqwest(ClientConfig::new("https://api.example.com")?)?;
/// let users = client.resource("/users/").build()?;
///
/// if let Some(get) = users.get() {
///     let user = get.call(CallInput::new().positional([json!(42)])).await?;
///     println!("{:?}", user.body);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Resource {
    base: String,
    routes: IndexMap<RouteName, Route>,
    extras: IndexMap<String, Route>,
}

impl Resource {
    /// The normalized base path.
    pub fn base_path(&self) -> &str {
        &self.base
    }

    /// `GET {base}/`
    pub fn list(&self) -> Option<&Route> {
        self.routes.get(&RouteName::List)
    }

    /// `GET {base}/:id:`
    pub fn get(&self) -> Option<&Route> {
        self.routes.get(&RouteName::Get)
    }

    /// `PUT {base}/:id:`
    pub fn edit(&self) -> Option<&Route> {
        self.routes.get(&RouteName::Edit)
    }

    /// `POST {base}/`
    pub fn add(&self) -> Option<&Route> {
        self.routes.get(&RouteName::Add)
    }

    /// Alias of [`add`](Self::add).
    pub fn set(&self) -> Option<&Route> {
        self.add()
    }

    /// `DELETE {base}/:id:`
    pub fn del(&self) -> Option<&Route> {
        self.routes.get(&RouteName::Del)
    }

    /// Alias of [`del`](Self::del).
    pub fn delete(&self) -> Option<&Route> {
        self.del()
    }

    /// Looks up a route by canonical name, alias or extra name.
    pub fn route(&self, name: &str) -> Option<&Route> {
        match RouteName::lookup(name) {
            Some(canonical) => self.routes.get(&canonical),
            None => self.extras.get(name),
        }
    }

    /// Names of every generated route, aliases included.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for name in self.routes.keys() {
            names.push(name.to_string());
            if let Some(alias) = name.alias() {
                names.push(alias.to_string());
            }
        }
        names.extend(self.extras.keys().cloned());
        names
    }
}
