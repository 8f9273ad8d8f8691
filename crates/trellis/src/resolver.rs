//! Turning route targets into endpoints.
//!
//! Container-key targets become [`LazyEndpoint`]s: nothing is looked up until
//! the first request, because route tables are drawn before registries
//! finish booting and most routes in a large tree are never hit. The lazy
//! endpoint never caches the component; the registry memoizes it.
//!
//! ```text
//! Unresolved --call--> Resolved   (every call delegates to the registry's instance)
//!            \
//!             --call--> Failed    (every call replays the same error)
//! ```

use crate::router::Router;
use crate::slice::Slice;
use crate::target::{DirectCallable, RouteTarget};
use http::StatusCode;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use trellis_config::RoutingConfig;
use trellis_core::{
    BoxFuture, BoxedEndpoint, Component, ComponentRegistry, Endpoint, RegistryError, Request,
    ResolveError, Response, ResponseExt, RoutingError, RoutingResult,
};
use trellis_telemetry::metrics::{record_resolution, ResolutionOutcome};

/// Resolves targets against one slice.
#[derive(Debug, Clone)]
pub struct Resolver {
    slice: Arc<Slice>,
    config: RoutingConfig,
}

impl Resolver {
    /// Creates a resolver for `slice`.
    #[must_use]
    pub fn new(slice: Arc<Slice>, config: RoutingConfig) -> Self {
        Self { slice, config }
    }

    /// The slice keys are resolved against.
    #[must_use]
    pub fn slice(&self) -> &Arc<Slice> {
        &self.slice
    }

    /// Turns `target` into an endpoint.
    ///
    /// Key targets are deferred. Constructors run now, once. Slice targets
    /// draw and freeze the child slice's routes.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::UnknownSlice`] for a slice target that is not
    /// a child of this slice, and [`RoutingError::Resolution`] when a
    /// constructor fails. Errors from the child's own route definition
    /// propagate unchanged.
    pub fn resolve(&self, target: &RouteTarget) -> RoutingResult<ResolvedTarget> {
        match target {
            RouteTarget::Key(key) => Ok(ResolvedTarget::Lazy(Arc::new(LazyEndpoint::new(
                key.clone(),
                Arc::clone(self.slice.registry()),
            )))),
            RouteTarget::Direct(DirectCallable::Instance(endpoint)) => {
                Ok(ResolvedTarget::Ready(Arc::clone(endpoint)))
            }
            RouteTarget::Direct(DirectCallable::Constructor(constructor)) => {
                let endpoint = constructor().map_err(|e| ResolveError::Construction {
                    key: target.to_string(),
                    reason: format!("{e:#}"),
                })?;
                Ok(ResolvedTarget::Ready(endpoint))
            }
            RouteTarget::Slice(name) => {
                let child = self
                    .slice
                    .child(name)
                    .ok_or_else(|| RoutingError::UnknownSlice(name.clone()))?;
                let app = Router::from_slice(Arc::clone(child), self.config.clone())?;
                Ok(ResolvedTarget::Ready(Arc::new(app)))
            }
        }
    }
}

/// A resolved route target.
#[derive(Clone)]
pub enum ResolvedTarget {
    /// Looked up in the registry on each call.
    Lazy(Arc<LazyEndpoint>),
    /// Ready to call.
    Ready(BoxedEndpoint),
}

impl ResolvedTarget {
    /// Dispatches `request`, surfacing resolution failures as errors.
    ///
    /// # Errors
    ///
    /// Returns the lazy endpoint's [`ResolveError`] when it cannot resolve.
    pub async fn dispatch(&self, request: Request) -> Result<Response, ResolveError> {
        match self {
            Self::Lazy(lazy) => {
                let endpoint = lazy.resolve()?;
                Ok(endpoint.call(request).await)
            }
            Self::Ready(endpoint) => Ok(endpoint.call(request).await),
        }
    }
}

impl Endpoint for ResolvedTarget {
    fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        match self {
            Self::Lazy(lazy) => lazy.call(request),
            Self::Ready(endpoint) => endpoint.call(request),
        }
    }
}

impl fmt::Debug for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lazy(lazy) => f.debug_tuple("Lazy").field(lazy).finish(),
            Self::Ready(_) => f.write_str("Ready"),
        }
    }
}

/// Observable state of a [`LazyEndpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LazyState {
    /// Not called yet.
    Unresolved,
    /// Resolved at least once.
    Resolved,
    /// Failed; the error is replayed on every call.
    Failed,
}

/// An endpoint that looks its component up on each call.
pub struct LazyEndpoint {
    key: String,
    registry: Arc<dyn ComponentRegistry>,
    failure: OnceLock<ResolveError>,
    resolved: AtomicBool,
}

impl LazyEndpoint {
    /// Creates an unresolved endpoint for `key`.
    pub fn new(key: impl Into<String>, registry: Arc<dyn ComponentRegistry>) -> Self {
        Self {
            key: key.into(),
            registry,
            failure: OnceLock::new(),
            resolved: AtomicBool::new(false),
        }
    }

    /// The container key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LazyState {
        if self.failure.get().is_some() {
            LazyState::Failed
        } else if self.resolved.load(Ordering::Acquire) {
            LazyState::Resolved
        } else {
            LazyState::Unresolved
        }
    }

    /// Checks the key against a booted registry without constructing it.
    ///
    /// Does nothing while the registry is still booting.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingAction`] when the registry is booted
    /// and the key is absent. The endpoint is then failed for good.
    pub fn verify(&self) -> Result<(), ResolveError> {
        if let Some(err) = self.failure.get() {
            return Err(err.clone());
        }
        if self.registry.booted() && !self.registry.key_registered(&self.key) {
            return Err(self.fail(self.missing_action()));
        }
        Ok(())
    }

    /// Resolves the component and returns it as an endpoint.
    ///
    /// # Errors
    ///
    /// Returns the resolution error. Once an error is returned, every later
    /// call returns the same error without consulting the registry.
    pub fn resolve(&self) -> Result<BoxedEndpoint, ResolveError> {
        if let Some(err) = self.failure.get() {
            record_resolution(ResolutionOutcome::Replayed);
            return Err(err.clone());
        }

        match self.lookup() {
            Ok(endpoint) => {
                if !self.resolved.swap(true, Ordering::AcqRel) {
                    record_resolution(ResolutionOutcome::Resolved);
                    tracing::debug!(key = %self.key, slice = %self.registry.name(), "endpoint resolved");
                }
                Ok(endpoint)
            }
            Err(err) => {
                record_resolution(ResolutionOutcome::Failed);
                Err(self.fail(err))
            }
        }
    }

    fn lookup(&self) -> Result<BoxedEndpoint, ResolveError> {
        if self.registry.booted() && !self.registry.key_registered(&self.key) {
            return Err(self.missing_action());
        }

        match self.registry.resolve_or_raise(&self.key) {
            Ok(Component::Endpoint(endpoint)) => Ok(endpoint),
            Ok(Component::Value(_)) => Err(ResolveError::NotCallable {
                key: self.key.clone(),
                slice: self.registry.name().to_string(),
            }),
            Err(RegistryError::NotRegistered { .. }) => Err(self.missing_action()),
            Err(RegistryError::Construction { reason, .. }) => Err(ResolveError::Construction {
                key: self.key.clone(),
                reason,
            }),
        }
    }

    fn missing_action(&self) -> ResolveError {
        ResolveError::MissingAction {
            key: self.key.clone(),
            slice: self.registry.name().to_string(),
        }
    }

    // Racing failures keep the first error.
    fn fail(&self, err: ResolveError) -> ResolveError {
        self.failure.get_or_init(|| err).clone()
    }
}

impl Endpoint for LazyEndpoint {
    fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            match self.resolve() {
                Ok(endpoint) => endpoint.call(request).await,
                Err(err) => error_response(&err),
            }
        })
    }
}

impl fmt::Debug for LazyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyEndpoint")
            .field("key", &self.key)
            .field("slice", &self.registry.name())
            .field("state", &self.state())
            .finish()
    }
}

/// Converts a resolution failure into a `500` JSON error response.
#[must_use]
pub fn error_response(err: &ResolveError) -> Response {
    tracing::error!(error.code = err.code(), error = %err, "endpoint resolution failed");
    Response::json_error(StatusCode::INTERNAL_SERVER_ERROR, err.code(), &err.to_string())
}
