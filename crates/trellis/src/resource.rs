//! RESTful resource route generation.
//!
//! A [`ResourceDefinition`] expands into one route per action, each with a
//! verb, a path, a route name and a container key:
//!
//! | Action  | Verb   | Path            | Name        |
//! |---------|--------|-----------------|-------------|
//! | index   | GET    | `/posts`        | `posts`     |
//! | new     | GET    | `/posts/new`    | `new_post`  |
//! | create  | POST   | `/posts`        | `posts`     |
//! | show    | GET    | `/posts/:id`    | `post`      |
//! | edit    | GET    | `/posts/:id/edit` | `edit_post` |
//! | update  | PATCH  | `/posts/:id`    | `post`      |
//! | destroy | DELETE | `/posts/:id`    | `post`      |
//!
//! Singular resources drop `index` and the `/:id` segment.

use crate::inflector::{pluralize, singularize};
use crate::scope::{Scope, ScopeSegment};
use http::Method;
use std::fmt;
use std::str::FromStr;
use trellis_core::RoutingError;

/// A RESTful action, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// List the collection.
    Index,
    /// Form for a new member.
    New,
    /// Create a member.
    Create,
    /// Show one member.
    Show,
    /// Form for editing a member.
    Edit,
    /// Update a member.
    Update,
    /// Delete a member.
    Destroy,
}

impl Action {
    /// Every action, in canonical order.
    pub const ALL: [Self; 7] = [
        Self::Index,
        Self::New,
        Self::Create,
        Self::Show,
        Self::Edit,
        Self::Update,
        Self::Destroy,
    ];

    /// Looks an action up by its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }

    /// The action's name, also the last container-key segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::New => "new",
            Self::Create => "create",
            Self::Show => "show",
            Self::Edit => "edit",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }

    fn template(self) -> (Method, &'static str, Option<&'static str>) {
        match self {
            Self::Index => (Method::GET, "", None),
            Self::New => (Method::GET, "/new", Some("new")),
            Self::Create => (Method::POST, "", None),
            Self::Show => (Method::GET, "/:id", None),
            Self::Edit => (Method::GET, "/:id/edit", Some("edit")),
            Self::Update => (Method::PATCH, "/:id", None),
            Self::Destroy => (Method::DELETE, "/:id", None),
        }
    }

    const fn is_collection(self) -> bool {
        matches!(self, Self::Index | Self::Create)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plural (`resources`) or singular (`resource`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A collection addressed by member id.
    Plural,
    /// A single resource without a member id.
    Singular,
}

impl ResourceKind {
    /// Actions generated when neither `only` nor `except` is given.
    #[must_use]
    pub fn default_actions(self) -> Vec<Action> {
        match self {
            Self::Plural => Action::ALL.to_vec(),
            Self::Singular => Action::ALL
                .into_iter()
                .filter(|action| *action != Action::Index)
                .collect(),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resources" | "plural" => Ok(Self::Plural),
            "resource" | "singular" => Ok(Self::Singular),
            other => Err(RoutingError::UnknownResourceKind(other.to_string())),
        }
    }
}

/// Options accepted by `resources` and `resource`.
///
/// ```
/// use trellis::resource::{Action, ResourceOptions};
///
/// let options = ResourceOptions::new()
///     .only([Action::Index, Action::Show])
///     .path("coffee-shops");
/// # let _ = options;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceOptions {
    only: Option<Vec<Action>>,
    except: Option<Vec<Action>>,
    path: Option<String>,
    as_name: Option<String>,
    to: Option<String>,
}

impl ResourceOptions {
    /// No restrictions or overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate only these actions. Takes precedence over `except`.
    #[must_use]
    pub fn only(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.only = Some(actions.into_iter().collect());
        self
    }

    /// Generate every default action except these.
    #[must_use]
    pub fn except(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.except = Some(actions.into_iter().collect());
        self
    }

    /// Like [`ResourceOptions::only`], by name. Unknown names are dropped.
    #[must_use]
    pub fn only_names<'a>(self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.only(names.into_iter().filter_map(Action::from_name))
    }

    /// Like [`ResourceOptions::except`], by name. Unknown names are dropped.
    #[must_use]
    pub fn except_names<'a>(self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.except(names.into_iter().filter_map(Action::from_name))
    }

    /// Overrides the URL segment. Keys and names still derive from the
    /// resource name.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Overrides the base of generated route names.
    #[must_use]
    pub fn as_name(mut self, name: impl Into<String>) -> Self {
        self.as_name = Some(name.into());
        self
    }

    /// Overrides the container-key base (`actions.<to>.<action>`).
    #[must_use]
    pub fn to(mut self, key: impl Into<String>) -> Self {
        self.to = Some(key.into());
        self
    }
}

/// One generated route, before the scope path prefix is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoute {
    /// The action.
    pub action: Action,
    /// HTTP verb.
    pub method: Method,
    /// Path relative to the enclosing scope.
    pub path: String,
    /// Full route name.
    pub name: String,
    /// Full container key.
    pub key: String,
}

/// A resource declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDefinition {
    name: String,
    kind: ResourceKind,
    options: ResourceOptions,
}

impl ResourceDefinition {
    /// Creates a definition.
    pub fn new(name: impl Into<String>, kind: ResourceKind, options: ResourceOptions) -> Self {
        Self {
            name: name.into(),
            kind,
            options,
        }
    }

    /// Resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The actions this definition generates, in canonical order.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        let defaults = self.kind.default_actions();
        match (&self.options.only, &self.options.except) {
            (Some(only), _) => defaults.into_iter().filter(|a| only.contains(a)).collect(),
            (None, Some(except)) => defaults.into_iter().filter(|a| !except.contains(a)).collect(),
            (None, None) => defaults,
        }
    }

    /// Generates the routes for this definition under `scope`.
    ///
    /// `namespace` is the leading container-key segment (normally `actions`).
    #[must_use]
    pub fn routes(&self, scope: &Scope, namespace: &str) -> Vec<ResourceRoute> {
        let base_path = self.base_path();
        let key_base = self.key_base(scope);
        let singular = self.singular_name();

        self.actions()
            .into_iter()
            .map(|action| {
                let (method, suffix, name_prefix) = action.template();
                let suffix = match self.kind {
                    ResourceKind::Plural => suffix,
                    ResourceKind::Singular => suffix.strip_prefix("/:id").unwrap_or(suffix),
                };

                let base = if self.kind == ResourceKind::Plural && action.is_collection() {
                    pluralize(&singular)
                } else {
                    singular.clone()
                };

                let mut parts: Vec<&str> = Vec::with_capacity(scope.name_prefix().len() + 2);
                parts.extend(name_prefix);
                parts.extend(scope.name_prefix().iter().map(String::as_str));
                parts.push(&base);

                ResourceRoute {
                    action,
                    method,
                    path: format!("{base_path}{suffix}"),
                    name: parts.join("_"),
                    key: format!("{namespace}.{key_base}.{action}"),
                }
            })
            .collect()
    }

    /// The scope segment pushed around a nested block.
    #[must_use]
    pub fn nested_segment(&self) -> ScopeSegment {
        let path = match self.kind {
            ResourceKind::Plural => {
                format!("{}/:{}_id", self.base_path(), singularize(&self.name))
            }
            ResourceKind::Singular => self.base_path(),
        };

        ScopeSegment::new()
            .path(path)
            .name(self.singular_name())
            .key(self.name.clone())
    }

    fn base_path(&self) -> String {
        let segment = self.options.path.as_deref().unwrap_or(&self.name);
        format!("/{}", segment.trim_matches('/'))
    }

    fn key_base(&self, scope: &Scope) -> String {
        if let Some(to) = &self.options.to {
            return to.clone();
        }
        if scope.key_namespace().is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", scope.key_namespace().join("."), self.name)
        }
    }

    fn singular_name(&self) -> String {
        if let Some(name) = &self.options.as_name {
            return name.clone();
        }
        match self.kind {
            ResourceKind::Plural => singularize(&self.name),
            ResourceKind::Singular => self.name.clone(),
        }
    }
}
