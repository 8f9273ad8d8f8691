//! Error types for the routing core.
//!
//! Two families are kept apart:
//!
//! - [`RoutingError`] is raised while route definitions are evaluated or the
//!   route table is frozen. It is fatal and halts startup.
//! - [`ResolveError`] is raised when a lazy endpoint is first invoked (or
//!   earlier, when boot verification is requested). It is `Clone` so a
//!   failed endpoint can hand back the identical error on every call.
//!
//! A request that matches no route is not an error at all.

use thiserror::Error;
use trellis_router::PathError;

/// Result type alias using [`RoutingError`].
pub type RoutingResult<T> = Result<T, RoutingError>;

/// Failure to turn a route target into a callable endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No component is registered under the route's container key.
    #[error("missing action {key:?} in slice {slice:?}")]
    MissingAction {
        /// Container key the route points at.
        key: String,
        /// Name of the slice whose registry was consulted.
        slice: String,
    },

    /// The registered component does not handle requests.
    #[error("component {key:?} in slice {slice:?} is not callable")]
    NotCallable {
        /// Container key the route points at.
        key: String,
        /// Name of the slice whose registry was consulted.
        slice: String,
    },

    /// The component exists but could not be built.
    #[error("failed to construct {key:?}: {reason}")]
    Construction {
        /// Container key or target description.
        key: String,
        /// Why construction failed.
        reason: String,
    },
}

impl ResolveError {
    /// Short machine-readable code used in error responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingAction { .. } => "missing_action",
            Self::NotCallable { .. } => "not_callable",
            Self::Construction { .. } => "construction_failed",
        }
    }
}

/// Configuration-time routing errors.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A resource kind other than plural or singular.
    #[error("unknown resource kind {0:?}")]
    UnknownResourceKind(String),

    /// A `before`/`after` anchor that was never registered.
    #[error("middleware {middleware:?} is positioned relative to unregistered middleware {anchor:?}")]
    UnknownMiddleware {
        /// The middleware being positioned.
        middleware: String,
        /// The identifier it refers to.
        anchor: String,
    },

    /// A scope was released out of order.
    #[error("scope released out of order: expected depth {expected}, found {found}")]
    ScopeMismatch {
        /// Depth recorded by the token.
        expected: usize,
        /// Depth of the stack at release time.
        found: usize,
    },

    /// The root scope was released.
    #[error("cannot release the root scope")]
    EmptyScopeStack,

    /// A slice name with no registered slice behind it.
    #[error("unknown slice {0:?}")]
    UnknownSlice(String),

    /// A route pattern the path router rejected.
    #[error("invalid route path {path:?}")]
    InvalidPath {
        /// The full pattern that was submitted.
        path: String,
        /// Why the path router rejected it.
        #[source]
        source: PathError,
    },

    /// Path generation for a route name that was never registered.
    #[error("no route named {0:?}")]
    UnknownRoute(String),

    /// Path generation without a value for a required parameter.
    #[error("route {route:?} requires parameter {param:?}")]
    MissingParam {
        /// The route name.
        route: String,
        /// The missing parameter.
        param: String,
    },

    /// A redirect whose target cannot be used as a `Location` header.
    #[error("invalid redirect target {0:?}")]
    InvalidRedirect(String),

    /// A target failed to resolve while the route table was being built or verified.
    #[error(transparent)]
    Resolution(#[from] ResolveError),
}
