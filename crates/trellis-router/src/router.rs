//! High-level path router API.

use http::Method;

use crate::error::PathError;
use crate::method_router::MethodRouter;
use crate::node::Node;
use crate::params::Params;
use crate::RouteMatch;

/// A radix tree router mapping verb + path to a handler of type `T`.
///
/// # Example
///
/// ```rust
/// use trellis_router::{MethodRouter, PathRouter};
/// use http::Method;
///
/// let mut router = PathRouter::new();
/// router.insert("/posts", MethodRouter::new().get("index").post("create")).unwrap();
/// router.insert("/posts/:id", MethodRouter::new().get("show")).unwrap();
///
/// let found = router.match_route(&Method::GET, "/posts/42").unwrap();
/// assert_eq!(*found.handler, "show");
/// assert_eq!(found.params.get("id"), Some("42"));
/// ```
///
/// # Route Priority
///
/// 1. **Static segments** (e.g., `/posts/new`)
/// 2. **Parameter segments** (e.g., `/posts/:id`), in insertion order
/// 3. **Wildcard segments** (e.g., `/admin/*path`)
#[derive(Debug, Clone)]
pub struct PathRouter<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for PathRouter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathRouter<T> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Inserts a route into the router.
    ///
    /// Registering a method already present at the same path keeps the first
    /// handler.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when the pattern is malformed.
    pub fn insert(&mut self, path: &str, methods: MethodRouter<T>) -> Result<(), PathError> {
        self.root.insert(path, methods)?;
        self.route_count += 1;
        Ok(())
    }

    /// Registers a single verb + path.
    ///
    /// This is the `register(verb, path, handler)` operation of the path
    /// router contract.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when the pattern is malformed.
    pub fn register(&mut self, method: &Method, path: &str, handler: T) -> Result<(), PathError> {
        self.insert(path, MethodRouter::new().method(method, handler))
    }

    /// Matches a path and method against the router.
    ///
    /// A static segment that has no handler for `method` does not hide a
    /// parameter sibling that does.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let (methods, params) = self.root.match_method(method, path)?;
        let handler = methods.handler(method)?;
        Some(RouteMatch::new(handler, params))
    }

    /// Matches a path against the router without looking at the method.
    ///
    /// Used to tell a 405 apart from a 404.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        self.root.match_path(path)
    }

    /// Returns the number of insertions performed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
