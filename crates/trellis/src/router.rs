//! The route declaration surface.
//!
//! A [`Router`] is mutated while route definitions run, then frozen by
//! [`Router::finish`] into an immutable [`App`]. It owns the scope stack and
//! the middleware stack for the duration of configuration and hands every
//! registration straight to the path router.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trellis::prelude::*;
//!
//! let slice = Arc::new(Slice::new("main", Arc::new(Container::new("main"))));
//!
//! let app = Router::draw(slice, RoutingConfig::default(), |r| {
//!     r.root("home.index")?;
//!     r.resources("posts", ResourceOptions::new())?;
//!     r.scope("/admin", |r| r.get("/stats", Route::to("admin.stats").named("stats")))
//! })
//! .unwrap();
//!
//! assert_eq!(app.path("post", &[("id", "7")]).unwrap(), "/posts/7");
//! assert_eq!(app.routes().len(), 9);
//! ```

use crate::app::{App, RouteEntry, RouteTable};
use crate::resolver::{ResolvedTarget, Resolver};
use crate::resource::{ResourceDefinition, ResourceKind, ResourceOptions};
use crate::scope::{join_paths, ScopeSegment, ScopeStack};
use crate::slice::Slice;
use crate::target::{Route, RouteRegistration, RouteTarget};
use http::{HeaderValue, Method, StatusCode, Uri};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use trellis_config::RoutingConfig;
use trellis_core::{
    endpoint_fn, BoxFuture, BoxedEndpoint, Endpoint, Request, Response, ResponseExt, RoutingError,
    RoutingResult,
};
use trellis_middleware::{Middleware, MiddlewareStack, Position};
use trellis_router::{MethodRouter, PathRouter};

/// Route table under construction.
pub struct Router {
    config: RoutingConfig,
    scopes: ScopeStack,
    middleware: MiddlewareStack,
    resolver: Resolver,
    routes: Vec<RouteRegistration>,
    table: PathRouter<RouteEntry>,
    names: IndexMap<String, String>,
    lazies: Vec<Arc<crate::resolver::LazyEndpoint>>,
}

impl Router {
    /// Creates a router for `slice` with the default routing configuration.
    #[must_use]
    pub fn new(slice: Arc<Slice>) -> Self {
        Self::with_config(slice, RoutingConfig::default())
    }

    /// Creates a router for `slice`.
    #[must_use]
    pub fn with_config(slice: Arc<Slice>, config: RoutingConfig) -> Self {
        Self {
            resolver: Resolver::new(slice, config.clone()),
            config,
            scopes: ScopeStack::new(),
            middleware: MiddlewareStack::new(),
            routes: Vec::new(),
            table: PathRouter::new(),
            names: IndexMap::new(),
            lazies: Vec::new(),
        }
    }

    /// Runs `definition` against a fresh router and freezes the result.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error raised by `definition` or by
    /// [`Router::finish`].
    pub fn draw<F>(slice: Arc<Slice>, config: RoutingConfig, definition: F) -> RoutingResult<App>
    where
        F: FnOnce(&mut Router) -> RoutingResult<()>,
    {
        let mut router = Self::with_config(slice, config);
        definition(&mut router)?;
        router.finish()
    }

    /// Draws the slice's own route definition, if it has one.
    ///
    /// # Errors
    ///
    /// Same as [`Router::draw`].
    pub fn from_slice(slice: Arc<Slice>, config: RoutingConfig) -> RoutingResult<App> {
        let routes = slice.routes().cloned();
        Self::draw(slice, config, |router| match routes {
            Some(routes) => routes(router),
            None => Ok(()),
        })
    }

    /// The routing configuration.
    #[must_use]
    pub const fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// The scope stack.
    #[must_use]
    pub const fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// The slice container keys currently resolve against.
    #[must_use]
    pub fn current_slice(&self) -> &Arc<Slice> {
        self.resolver.slice()
    }

    /// Routes registered so far.
    #[must_use]
    pub fn registrations(&self) -> &[RouteRegistration] {
        &self.routes
    }

    // --- verbs -------------------------------------------------------------

    /// Registers a `GET` route. It also answers `HEAD`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidPath`] for a malformed pattern, or a
    /// resolution error for a direct target that cannot be built.
    pub fn get(&mut self, path: &str, route: impl Into<Route>) -> RoutingResult<()> {
        self.route(Method::GET, path, route)
    }

    /// Registers a `POST` route.
    ///
    /// # Errors
    ///
    /// See [`Router::get`].
    pub fn post(&mut self, path: &str, route: impl Into<Route>) -> RoutingResult<()> {
        self.route(Method::POST, path, route)
    }

    /// Registers a `PUT` route.
    ///
    /// # Errors
    ///
    /// See [`Router::get`].
    pub fn put(&mut self, path: &str, route: impl Into<Route>) -> RoutingResult<()> {
        self.route(Method::PUT, path, route)
    }

    /// Registers a `PATCH` route.
    ///
    /// # Errors
    ///
    /// See [`Router::get`].
    pub fn patch(&mut self, path: &str, route: impl Into<Route>) -> RoutingResult<()> {
        self.route(Method::PATCH, path, route)
    }

    /// Registers a `DELETE` route.
    ///
    /// # Errors
    ///
    /// See [`Router::get`].
    pub fn delete(&mut self, path: &str, route: impl Into<Route>) -> RoutingResult<()> {
        self.route(Method::DELETE, path, route)
    }

    /// Registers a route for `method`.
    ///
    /// # Errors
    ///
    /// See [`Router::get`].
    pub fn route(&mut self, method: Method, path: &str, route: impl Into<Route>) -> RoutingResult<()> {
        let (target, name) = route.into().into_parts(&self.config.action_key_namespace);
        let scope = Arc::clone(self.scopes.current());
        let name = name.map(|name| scope.name([name.as_str()]));
        self.add_route(Some(method), scope.path(path), name, target)
    }

    /// Registers `GET /` named `root`.
    ///
    /// # Errors
    ///
    /// See [`Router::get`].
    pub fn root(&mut self, route: impl Into<Route>) -> RoutingResult<()> {
        self.get("/", route.into().named("root"))
    }

    /// Redirects `from` to `to` with `301 Moved Permanently`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidRedirect`] when `to` is not a valid
    /// `Location` value.
    pub fn redirect(&mut self, from: &str, to: &str) -> RoutingResult<()> {
        self.redirect_with(from, to, StatusCode::MOVED_PERMANENTLY)
    }

    /// Redirects `from` to `to` with `status`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidRedirect`] when `to` is not a valid
    /// `Location` value or `status` is not a redirection.
    pub fn redirect_with(&mut self, from: &str, to: &str, status: StatusCode) -> RoutingResult<()> {
        if !status.is_redirection() {
            return Err(RoutingError::InvalidRedirect(format!("{to} ({status})")));
        }
        let location =
            HeaderValue::from_str(to).map_err(|_| RoutingError::InvalidRedirect(to.to_string()))?;

        let endpoint = endpoint_fn(move |_req| {
            let response = Response::redirect(status, location.clone());
            async move { response }
        });
        let path = self.scopes.current().path(from);
        self.add_route(Some(Method::GET), path, None, RouteTarget::endpoint(endpoint))
    }

    // --- resources ---------------------------------------------------------

    /// Declares a plural resource.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidPath`] for a malformed `path` option.
    pub fn resources(&mut self, name: &str, options: ResourceOptions) -> RoutingResult<()> {
        self.define_resource(ResourceDefinition::new(name, ResourceKind::Plural, options), None::<Nested>)
    }

    /// Declares a plural resource with nested routes.
    ///
    /// Nested routes sit under `/<name>/:<singular>_id` and inherit the
    /// resource's name and key prefixes.
    ///
    /// # Errors
    ///
    /// Returns the first error from the resource or from `nested`.
    pub fn resources_with<F>(&mut self, name: &str, options: ResourceOptions, nested: F) -> RoutingResult<()>
    where
        F: FnOnce(&mut Router) -> RoutingResult<()>,
    {
        self.define_resource(ResourceDefinition::new(name, ResourceKind::Plural, options), Some(nested))
    }

    /// Declares a singular resource.
    ///
    /// # Errors
    ///
    /// See [`Router::resources`].
    pub fn resource(&mut self, name: &str, options: ResourceOptions) -> RoutingResult<()> {
        self.define_resource(ResourceDefinition::new(name, ResourceKind::Singular, options), None::<Nested>)
    }

    /// Declares a singular resource with nested routes under `/<name>`.
    ///
    /// # Errors
    ///
    /// See [`Router::resources_with`].
    pub fn resource_with<F>(&mut self, name: &str, options: ResourceOptions, nested: F) -> RoutingResult<()>
    where
        F: FnOnce(&mut Router) -> RoutingResult<()>,
    {
        self.define_resource(ResourceDefinition::new(name, ResourceKind::Singular, options), Some(nested))
    }

    /// Declares a resource whose kind is given by name (`"resources"` or
    /// `"resource"`).
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::UnknownResourceKind`] for any other kind.
    pub fn declare_resource(&mut self, kind: &str, name: &str, options: ResourceOptions) -> RoutingResult<()> {
        let kind: ResourceKind = kind.parse()?;
        self.define_resource(ResourceDefinition::new(name, kind, options), None::<Nested>)
    }

    fn define_resource<F>(&mut self, definition: ResourceDefinition, nested: Option<F>) -> RoutingResult<()>
    where
        F: FnOnce(&mut Router) -> RoutingResult<()>,
    {
        let scope = Arc::clone(self.scopes.current());
        for route in definition.routes(&scope, &self.config.action_key_namespace) {
            self.add_route(
                Some(route.method),
                scope.path(&route.path),
                Some(route.name),
                RouteTarget::Key(route.key),
            )?;
        }

        match nested {
            Some(nested) => self.within(definition.nested_segment(), nested),
            None => Ok(()),
        }
    }

    // --- scopes and slices -------------------------------------------------

    /// Nests routes under a path prefix.
    ///
    /// # Errors
    ///
    /// Returns the first error from `routes`.
    pub fn scope<F>(&mut self, path: &str, routes: F) -> RoutingResult<()>
    where
        F: FnOnce(&mut Router) -> RoutingResult<()>,
    {
        self.within(ScopeSegment::new().path(path), routes)
    }

    /// Nests routes under a path prefix and a route-name prefix.
    ///
    /// # Errors
    ///
    /// Returns the first error from `routes`.
    pub fn named_scope<F>(&mut self, path: &str, as_name: &str, routes: F) -> RoutingResult<()>
    where
        F: FnOnce(&mut Router) -> RoutingResult<()>,
    {
        self.within(ScopeSegment::new().path(path).name(as_name), routes)
    }

    /// Runs `routes` inside `segment`. The scope is popped even when
    /// `routes` fails.
    ///
    /// # Errors
    ///
    /// Returns the error from `routes`, or a scope error if `routes` left the
    /// stack unbalanced.
    pub fn within<F>(&mut self, segment: ScopeSegment, routes: F) -> RoutingResult<()>
    where
        F: FnOnce(&mut Router) -> RoutingResult<()>,
    {
        let token = self.scopes.push(segment);
        let result = routes(self);
        let popped = self.scopes.pop(token);
        result.and(popped)
    }

    /// Declares routes that resolve against the child slice `name`, under
    /// `at`, with route names prefixed by the slice name.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::UnknownSlice`] if the current slice has no such
    /// child, or the first error from `routes`.
    pub fn slice<F>(&mut self, name: &str, at: &str, routes: F) -> RoutingResult<()>
    where
        F: FnOnce(&mut Router) -> RoutingResult<()>,
    {
        self.named_slice(name, at, name, routes)
    }

    /// Like [`Router::slice`] with an explicit route-name prefix.
    ///
    /// # Errors
    ///
    /// See [`Router::slice`].
    pub fn named_slice<F>(&mut self, name: &str, at: &str, as_name: &str, routes: F) -> RoutingResult<()>
    where
        F: FnOnce(&mut Router) -> RoutingResult<()>,
    {
        let child = self
            .resolver
            .slice()
            .child(name)
            .cloned()
            .ok_or_else(|| RoutingError::UnknownSlice(name.to_string()))?;

        let parent = std::mem::replace(&mut self.resolver, Resolver::new(child, self.config.clone()));
        let result = self.within(ScopeSegment::new().path(at).name(as_name), routes);
        self.resolver = parent;
        result
    }

    /// Mounts the child slice `name` at `at`, drawing its own routes.
    ///
    /// Every verb under `at` is forwarded with the prefix stripped.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::UnknownSlice`] or any error raised while the
    /// child's routes are drawn.
    pub fn mount_slice(&mut self, name: &str, at: &str) -> RoutingResult<()> {
        self.add_mount(at, RouteTarget::Slice(name.to_string()))
    }

    /// Mounts an endpoint at `at`, forwarding every verb with the prefix
    /// stripped.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidPath`] for a malformed `at`.
    pub fn mount(&mut self, endpoint: impl Endpoint, at: &str) -> RoutingResult<()> {
        self.add_mount(at, RouteTarget::endpoint(endpoint))
    }

    // --- middleware --------------------------------------------------------

    /// Appends middleware for requests under the current scope.
    pub fn use_middleware(&mut self, middleware: impl Middleware) {
        self.insert_middleware(middleware, Position::Append);
    }

    /// Declares middleware for the current scope at `position`.
    ///
    /// Anchors are resolved by [`Router::finish`].
    pub fn insert_middleware(&mut self, middleware: impl Middleware, position: Position) {
        let prefix = self.scopes.current().path_prefix().to_string();
        self.middleware.use_middleware(prefix, middleware, position);
    }

    // --- freezing ----------------------------------------------------------

    /// Freezes the route table and middleware into an [`App`].
    ///
    /// When `verify_on_boot` is set, every container-key target is checked
    /// against its registry; keys missing from a booted registry fail here.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Resolution`] for a missing action and
    /// [`RoutingError::UnknownMiddleware`] for an unresolved anchor.
    pub fn finish(self) -> RoutingResult<App> {
        if self.config.verify_on_boot {
            crate::app::verify_all(&self.lazies)?;
        }

        let table = Arc::new(RouteTable::new(self.table, self.routes, self.names));
        let inner: BoxedEndpoint = table.clone();
        let chains = self.middleware.freeze(inner)?;

        tracing::info!(
            slice = %self.resolver.slice().name(),
            routes = table.registrations().len(),
            chains = chains.prefixes().count() + 1,
            "route table frozen"
        );

        Ok(App::new(table, chains, self.lazies, self.config.base_url))
    }

    fn add_route(
        &mut self,
        method: Option<Method>,
        path: String,
        name: Option<String>,
        target: RouteTarget,
    ) -> RoutingResult<()> {
        let resolved = self.resolver.resolve(&target)?;
        if let ResolvedTarget::Lazy(lazy) = &resolved {
            self.lazies.push(Arc::clone(lazy));
        }

        let entry = RouteEntry::new(self.routes.len(), resolved);
        let methods = match &method {
            Some(method) => MethodRouter::new().method(method, entry),
            None => MethodRouter::new().any(entry),
        };
        self.insert(&path, methods)?;

        if let Some(name) = &name {
            self.names.entry(name.clone()).or_insert_with(|| path.clone());
        }

        tracing::debug!(
            http.method = method.as_ref().map_or("*", Method::as_str),
            http.path = %path,
            route = name.as_deref().unwrap_or(""),
            target = %target,
            "route registered"
        );

        self.routes.push(RouteRegistration {
            method,
            path,
            name,
            target,
        });
        Ok(())
    }

    fn add_mount(&mut self, at: &str, target: RouteTarget) -> RoutingResult<()> {
        let path = self.scopes.current().path(at);
        let depth = path.split('/').filter(|s| !s.is_empty()).count();
        let resolved = self.resolver.resolve(&target)?;

        let mount = Mount {
            depth,
            inner: Arc::new(resolved),
        };
        let entry = RouteEntry::new(self.routes.len(), ResolvedTarget::Ready(Arc::new(mount)));
        self.insert(&path, MethodRouter::new().any(entry.clone()))?;
        self.insert(&join_paths(&path, "*rest"), MethodRouter::new().any(entry))?;

        tracing::debug!(http.path = %path, target = %target, "endpoint mounted");

        self.routes.push(RouteRegistration {
            method: None,
            path,
            name: None,
            target,
        });
        Ok(())
    }

    fn insert(&mut self, path: &str, methods: MethodRouter<RouteEntry>) -> RoutingResult<()> {
        self.table
            .insert(path, methods)
            .map_err(|source| RoutingError::InvalidPath {
                path: path.to_string(),
                source,
            })
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("slice", &self.resolver.slice().name())
            .field("scope_depth", &self.scopes.depth())
            .field("routes", &self.routes.len())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

type Nested = fn(&mut Router) -> RoutingResult<()>;

/// Forwards to `inner` with the first `depth` path segments removed.
struct Mount {
    depth: usize,
    inner: BoxedEndpoint,
}

impl Mount {
    fn strip(&self, uri: &Uri) -> Option<Uri> {
        let rest: Vec<&str> = uri
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .skip(self.depth)
            .collect();
        let mut stripped = format!("/{}", rest.join("/"));
        if let Some(query) = uri.query() {
            stripped.push('?');
            stripped.push_str(query);
        }
        stripped.parse().ok()
    }
}

impl Endpoint for Mount {
    fn call(&self, mut request: Request) -> BoxFuture<'_, Response> {
        if let Some(uri) = self.strip(request.uri()) {
            *request.uri_mut() = uri;
        }
        self.inner.call(request)
    }
}
