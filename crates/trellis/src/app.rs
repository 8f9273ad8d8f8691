//! The frozen routing application.

use crate::resolver::{error_response, LazyEndpoint, ResolvedTarget};
use crate::target::RouteRegistration;
use http::header::ALLOW;
use http::{HeaderValue, Method, StatusCode};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use trellis_core::{
    BoxFuture, Endpoint, Request, ResolveError, Response, ResponseExt, RoutingError, RoutingResult,
};
use trellis_middleware::ScopedChains;
use trellis_router::{Params, PathRouter};
use trellis_telemetry::metrics;

/// What the path router stores per verb slot.
#[derive(Debug, Clone)]
pub(crate) struct RouteEntry {
    index: usize,
    target: ResolvedTarget,
}

impl RouteEntry {
    pub(crate) fn new(index: usize, target: ResolvedTarget) -> Self {
        Self { index, target }
    }
}

/// Matches requests and dispatches them to their targets. Runs beneath the
/// middleware chains.
pub(crate) struct RouteTable {
    router: PathRouter<RouteEntry>,
    routes: Vec<RouteRegistration>,
    names: IndexMap<String, String>,
}

impl RouteTable {
    pub(crate) fn new(
        router: PathRouter<RouteEntry>,
        routes: Vec<RouteRegistration>,
        names: IndexMap<String, String>,
    ) -> Self {
        Self {
            router,
            routes,
            names,
        }
    }

    pub(crate) fn registrations(&self) -> &[RouteRegistration] {
        &self.routes
    }

    async fn try_dispatch(&self, mut request: Request) -> Result<Response, ResolveError> {
        let method = request.method().clone();
        let matched = self.router.match_route(&method, request.uri().path());
        if let Some(matched) = matched {
            request.extensions_mut().insert(matched.params);
            return matched.handler.target.dispatch(request).await;
        }

        let Some((methods, _)) = self.router.match_path(request.uri().path()) else {
            metrics::record_not_found(method.as_str());
            return Ok(Response::text(StatusCode::NOT_FOUND, "Not Found"));
        };

        metrics::record_method_not_allowed(method.as_str());
        let allow = methods
            .allowed_methods()
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let mut response = Response::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers_mut().insert(ALLOW, value);
        }
        Ok(response)
    }

    /// Path pattern of the route a request lands on, including a path whose
    /// verb is not allowed.
    fn pattern(&self, method: &Method, path: &str) -> Option<&str> {
        let entry = match self.router.match_route(method, path) {
            Some(matched) => matched.handler,
            None => {
                let (methods, _) = self.router.match_path(path)?;
                let allowed = methods.allowed_methods();
                methods.handler(allowed.first()?)?
            }
        };
        Some(&self.routes[entry.index].path)
    }
}

impl Endpoint for RouteTable {
    fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            match self.try_dispatch(request).await {
                Ok(response) => response,
                Err(err) => error_response(&err),
            }
        })
    }
}

/// A frozen route table wrapped in its middleware.
///
/// Immutable and shareable across request tasks.
pub struct App {
    table: Arc<RouteTable>,
    chains: ScopedChains,
    lazies: Vec<Arc<LazyEndpoint>>,
    base_url: String,
}

impl App {
    pub(crate) fn new(
        table: Arc<RouteTable>,
        chains: ScopedChains,
        lazies: Vec<Arc<LazyEndpoint>>,
        base_url: String,
    ) -> Self {
        Self {
            table,
            chains,
            lazies,
            base_url,
        }
    }

    /// Dispatches without middleware, returning resolution failures as
    /// errors instead of `500` responses.
    ///
    /// Unmatched paths and verbs still produce `404`/`405` responses.
    ///
    /// # Errors
    ///
    /// Returns the matched endpoint's [`ResolveError`].
    pub async fn try_dispatch(&self, request: Request) -> Result<Response, ResolveError> {
        self.table.try_dispatch(request).await
    }

    /// Finds the route `method` and `path` would dispatch to.
    #[must_use]
    pub fn recognize(&self, method: &Method, path: &str) -> Option<Recognized<'_>> {
        let matched = self.table.router.match_route(method, path)?;
        Some(Recognized {
            registration: &self.table.routes[matched.handler.index],
            params: matched.params,
        })
    }

    /// Renders the path of the named route.
    ///
    /// Extra parameters are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::UnknownRoute`] for an unregistered name and
    /// [`RoutingError::MissingParam`] when a `:param` or `*param` segment
    /// has no value.
    pub fn path(&self, name: &str, params: &[(&str, &str)]) -> RoutingResult<String> {
        let template = self
            .table
            .names
            .get(name)
            .ok_or_else(|| RoutingError::UnknownRoute(name.to_string()))?;

        let mut path = String::with_capacity(template.len());
        for segment in template.split('/').filter(|s| !s.is_empty()) {
            path.push('/');
            match segment.strip_prefix(':').or_else(|| segment.strip_prefix('*')) {
                Some(param) => {
                    let value = params
                        .iter()
                        .find(|(key, _)| *key == param)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| RoutingError::MissingParam {
                            route: name.to_string(),
                            param: param.to_string(),
                        })?;
                    path.push_str(value);
                }
                None => path.push_str(segment),
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }

    /// Renders the absolute URL of the named route against the configured
    /// base URL.
    ///
    /// # Errors
    ///
    /// Same as [`App::path`].
    pub fn url(&self, name: &str, params: &[(&str, &str)]) -> RoutingResult<String> {
        let path = self.path(name, params)?;
        Ok(format!("{}{path}", self.base_url.trim_end_matches('/')))
    }

    /// Every registered route, in declaration order.
    #[must_use]
    pub fn routes(&self) -> Routes<'_> {
        Routes {
            routes: &self.table.routes,
        }
    }

    /// The frozen middleware chains.
    #[must_use]
    pub const fn middleware(&self) -> &ScopedChains {
        &self.chains
    }

    /// Checks every container-key target against its registry.
    ///
    /// Use this once registries have booted if the table was frozen before.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Resolution`] for the first missing action.
    pub fn verify(&self) -> RoutingResult<()> {
        verify_all(&self.lazies)
    }
}

impl Endpoint for App {
    fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        let chain = match self.table.pattern(request.method(), request.uri().path()) {
            Some(pattern) => self.chains.for_route(pattern),
            None => self.chains.select(request.uri().path()),
        };
        chain.call(request)
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.table.routes.len())
            .field("named", &self.table.names.len())
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub(crate) fn verify_all(lazies: &[Arc<LazyEndpoint>]) -> RoutingResult<()> {
    for lazy in lazies {
        if let Err(err) = lazy.verify() {
            tracing::warn!(key = %lazy.key(), error.code = err.code(), "route target missing from booted registry");
            return Err(err.into());
        }
    }
    Ok(())
}

/// Result of [`App::recognize`].
#[derive(Debug)]
pub struct Recognized<'a> {
    /// The matched route.
    pub registration: &'a RouteRegistration,
    /// Path parameters.
    pub params: Params,
}

/// A listing of registered routes.
#[derive(Debug, Clone, Copy)]
pub struct Routes<'a> {
    routes: &'a [RouteRegistration],
}

impl<'a> Routes<'a> {
    /// Iterates the routes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &'a RouteRegistration> {
        self.routes.iter()
    }

    /// Number of routes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<'a> IntoIterator for Routes<'a> {
    type Item = &'a RouteRegistration;
    type IntoIter = std::slice::Iter<'a, RouteRegistration>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

impl fmt::Display for Routes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<[String; 4]> = self
            .routes
            .iter()
            .map(|route| {
                [
                    route.method.as_ref().map_or("*", Method::as_str).to_string(),
                    route.path.clone(),
                    route.name.clone().unwrap_or_default(),
                    route.target.to_string(),
                ]
            })
            .collect();

        let mut widths = [0_usize; 3];
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.len());
            }
        }

        for [method, path, name, target] in &rows {
            let line = format!(
                "{method:<mw$}  {path:<pw$}  {name:<nw$}  {target}",
                mw = widths[0],
                pw = widths[1],
                nw = widths[2],
            );
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
