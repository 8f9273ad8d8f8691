//! # Trellis
//!
//! **Convention-driven routing for slice-based applications**
//!
//! Trellis turns a block of route declarations into an immutable request
//! handler:
//!
//! - **Scopes** nest URL, route-name and container-key prefixes
//! - **Resources** expand into the seven RESTful routes (six for singular
//!   resources) with conventional names and container keys
//! - **Lazy endpoints** defer component lookup to the first request, with
//!   optional fail-fast verification against a booted registry
//! - **Middleware** is declared with `before`/`after` positioning and scoped
//!   to path prefixes
//! - **Slices** resolve keys against their own registries and can be mounted
//!   as sub-applications
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use trellis::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let container = Arc::new(Container::new("main"));
//! container.register_endpoint(
//!     "actions.posts.index",
//!     endpoint_fn(|_req| async { Response::text(http::StatusCode::OK, "all posts") }),
//! );
//!
//! let slice = Arc::new(Slice::new("main", container));
//! let app = Router::draw(slice, RoutingConfig::default(), |r| {
//!     r.resources("posts", ResourceOptions::new().only([Action::Index, Action::Show]))
//! })?;
//!
//! let request = http::Request::get("/posts").body(Default::default())?;
//! let response = app.call(request).await;
//! assert_eq!(response.status(), http::StatusCode::OK);
//! # Ok(())
//! # }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Request → chain of the matched route's scope (request path on a 404) → RouteTable
//!             → 404 / 405 / LazyEndpoint → registry.resolve_or_raise(key) → action
//! ```

#![doc(html_root_url = "https://docs.rs/trellis/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod inflector;
pub mod resolver;
pub mod resource;
pub mod router;
pub mod scope;
pub mod slice;
pub mod target;

pub use app::{App, Recognized, Routes};
pub use resolver::{LazyEndpoint, LazyState, ResolvedTarget, Resolver};
pub use resource::{Action, ResourceDefinition, ResourceKind, ResourceOptions};
pub use router::Router;
pub use scope::{Scope, ScopeSegment, ScopeStack, ScopeToken};
pub use slice::Slice;
pub use target::{DirectCallable, Route, RouteRegistration, RouteTarget};

// Re-export the collaborating crates
pub use trellis_config as config;
pub use trellis_core as core;
pub use trellis_middleware as middleware;
pub use trellis_router as path_router;
pub use trellis_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Action, App, ResourceOptions, Route, RouteTarget, Router, Slice,
    };
    // Core contracts
    pub use trellis_core::{
        endpoint_fn, Component, ComponentRegistry, Container, Endpoint, Request, ResolveError,
        Response, ResponseExt, RoutingError, RoutingResult,
    };
    // Middleware
    pub use trellis_middleware::{FnMiddleware, Middleware, Next, Position};
    // Configuration
    pub use trellis_config::{RoutingConfig, TrellisConfig};
    // Path parameters placed in request extensions
    pub use trellis_router::Params;
}
