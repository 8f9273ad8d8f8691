//! Slices: isolated sub-applications with their own registry and routes.

use crate::router::Router;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use trellis_core::{ComponentRegistry, RoutingResult};

/// A route definition attached to a slice.
pub type RouteDefinition = Arc<dyn Fn(&mut Router) -> RoutingResult<()> + Send + Sync>;

/// A named sub-application.
///
/// The router only references a slice's registry; the slice owns it.
///
/// ```
/// use std::sync::Arc;
/// use trellis::Slice;
/// use trellis_core::Container;
///
/// let admin = Slice::new("admin", Arc::new(Container::new("admin")));
/// let main = Slice::new("main", Arc::new(Container::new("main"))).with_child(admin);
///
/// assert!(main.child("admin").is_some());
/// ```
#[derive(Clone)]
pub struct Slice {
    name: String,
    registry: Arc<dyn ComponentRegistry>,
    children: IndexMap<String, Arc<Slice>>,
    routes: Option<RouteDefinition>,
}

impl Slice {
    /// Creates a slice backed by `registry`.
    pub fn new(name: impl Into<String>, registry: Arc<dyn ComponentRegistry>) -> Self {
        Self {
            name: name.into(),
            registry,
            children: IndexMap::new(),
            routes: None,
        }
    }

    /// Adds a child slice, replacing any child with the same name.
    #[must_use]
    pub fn with_child(mut self, child: Slice) -> Self {
        self.children.insert(child.name.clone(), Arc::new(child));
        self
    }

    /// Attaches the slice's own route definition, drawn when it is mounted.
    #[must_use]
    pub fn with_routes<F>(mut self, routes: F) -> Self
    where
        F: Fn(&mut Router) -> RoutingResult<()> + Send + Sync + 'static,
    {
        self.routes = Some(Arc::new(routes));
        self
    }

    /// Slice name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The slice's component registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<dyn ComponentRegistry> {
        &self.registry
    }

    /// Looks up a direct child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Arc<Slice>> {
        self.children.get(name)
    }

    /// Direct children, in declaration order.
    pub fn children(&self) -> impl Iterator<Item = &Arc<Slice>> {
        self.children.values()
    }

    /// The slice's own route definition.
    #[must_use]
    pub fn routes(&self) -> Option<&RouteDefinition> {
        self.routes.as_ref()
    }
}

impl fmt::Debug for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slice")
            .field("name", &self.name)
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .field("has_routes", &self.routes.is_some())
            .finish()
    }
}
