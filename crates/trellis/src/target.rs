//! Route targets and registrations.

use http::Method;
use std::fmt;
use std::sync::Arc;
use trellis_core::{BoxedEndpoint, Endpoint};

/// A constructor run once when the route is resolved.
pub type EndpointConstructor = Arc<dyn Fn() -> anyhow::Result<BoxedEndpoint> + Send + Sync>;

/// A target that is already callable, or knows how to build its callable.
#[derive(Clone)]
pub enum DirectCallable {
    /// An endpoint instance, used as is.
    Instance(BoxedEndpoint),
    /// A constructor, invoked once at resolution time.
    Constructor(EndpointConstructor),
}

impl fmt::Debug for DirectCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(_) => f.write_str("DirectCallable::Instance"),
            Self::Constructor(_) => f.write_str("DirectCallable::Constructor"),
        }
    }
}

/// What a route dispatches to.
#[derive(Debug, Clone)]
pub enum RouteTarget {
    /// A container key, looked up in the slice registry on first call.
    Key(String),
    /// An endpoint supplied directly.
    Direct(DirectCallable),
    /// A child slice whose own routes handle the request.
    Slice(String),
}

impl RouteTarget {
    /// Container-key target.
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// Direct endpoint target.
    pub fn endpoint(endpoint: impl Endpoint) -> Self {
        Self::Direct(DirectCallable::Instance(Arc::new(endpoint)))
    }

    /// Returns the container key, if this is a key target.
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Direct(DirectCallable::Instance(_)) => f.write_str("(endpoint)"),
            Self::Direct(DirectCallable::Constructor(_)) => f.write_str("(constructor)"),
            Self::Slice(name) => write!(f, "slice:{name}"),
        }
    }
}

/// A route as declared, with the scope prefix already applied.
#[derive(Debug, Clone)]
pub struct RouteRegistration {
    /// The verb, or `None` for routes answering every verb (mounts).
    pub method: Option<Method>,
    /// Full path pattern.
    pub path: String,
    /// Full route name, if the route is named.
    pub name: Option<String>,
    /// Dispatch target.
    pub target: RouteTarget,
}

impl fmt::Display for RouteRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = self.method.as_ref().map_or("*", Method::as_str);
        write!(f, "{method} {}", self.path)?;
        if let Some(name) = &self.name {
            write!(f, " as {name}")?;
        }
        write!(f, " => {}", self.target)
    }
}

#[derive(Debug, Clone)]
enum To {
    Action(String),
    Target(RouteTarget),
}

/// The `to:`/`as:` half of a verb route.
///
/// A bare string is an action key relative to the key namespace:
///
/// ```
/// use trellis::Route;
///
/// let index: Route = "posts.index".into();
/// let named = Route::to("home.show").named("home");
/// # let _ = (index, named);
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    to: To,
    name: Option<String>,
}

impl Route {
    /// Targets an action key such as `"posts.index"`.
    pub fn to(action: impl Into<String>) -> Self {
        Self {
            to: To::Action(action.into()),
            name: None,
        }
    }

    /// Targets an existing endpoint.
    pub fn endpoint(endpoint: impl Endpoint) -> Self {
        Self::target(RouteTarget::endpoint(endpoint))
    }

    /// Targets an endpoint built once by `constructor`.
    pub fn constructor<F, E>(constructor: F) -> Self
    where
        F: Fn() -> anyhow::Result<E> + Send + Sync + 'static,
        E: Endpoint,
    {
        let constructor: EndpointConstructor =
            Arc::new(move || constructor().map(|endpoint| Arc::new(endpoint) as BoxedEndpoint));
        Self::target(RouteTarget::Direct(DirectCallable::Constructor(constructor)))
    }

    /// Targets anything expressible as a [`RouteTarget`].
    pub fn target(target: RouteTarget) -> Self {
        Self {
            to: To::Target(target),
            name: None,
        }
    }

    /// Names the route. The current name scope is prepended.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn into_parts(self, namespace: &str) -> (RouteTarget, Option<String>) {
        let target = match self.to {
            To::Action(action) => RouteTarget::Key(format!("{namespace}.{action}")),
            To::Target(target) => target,
        };
        (target, self.name)
    }
}

impl From<&str> for Route {
    fn from(action: &str) -> Self {
        Self::to(action)
    }
}

impl From<String> for Route {
    fn from(action: String) -> Self {
        Self::to(action)
    }
}

impl From<RouteTarget> for Route {
    fn from(target: RouteTarget) -> Self {
        Self::target(target)
    }
}
