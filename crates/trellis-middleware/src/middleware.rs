//! Core middleware trait and types.
//!
//! Middleware wraps the next element of the chain: it receives the request
//! and a [`Next`] handle, and decides whether (and how) to call it.
//!
//! # Example
//!
//! ```
//! use trellis_middleware::{BoxFuture, Middleware, Next};
//! use trellis_core::{Request, Response};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let started = std::time::Instant::now();
//!             let response = next.run(request).await;
//!             tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "request finished");
//!             response
//!         })
//!     }
//! }
//! ```

use trellis_core::{Endpoint, Request, Response};

pub use trellis_core::BoxFuture;

/// The core middleware trait.
///
/// The value returned by [`Middleware::name`] is the identifier other
/// registrations use to position themselves `before` or `after` this one.
///
/// # Invariants
///
/// - Middleware MUST call `next.run()` at most once
/// - Middleware SHOULD NOT swallow responses from downstream
pub trait Middleware: Send + Sync + 'static {
    /// Returns the identifier of this middleware.
    fn name(&self) -> &'static str;

    /// Processes the request, delegating to `next` to continue the chain.
    fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response>;
}

/// Handle to the remainder of the chain.
///
/// Consumed by [`Next::run`], so it can be invoked at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Endpoint(&'a dyn Endpoint),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke `middleware`, then `next`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal `Next` that invokes the wrapped endpoint.
    pub(crate) fn endpoint(endpoint: &'a dyn Endpoint) -> Self {
        Self {
            inner: NextInner::Endpoint(endpoint),
        }
    }

    /// Invokes the next middleware or the wrapped endpoint.
    pub async fn run(self, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(request, *next).await,
            NextInner::Endpoint(endpoint) => endpoint.call(request).await,
        }
    }
}

/// A middleware built from a closure returning a boxed future.
///
/// ```
/// use http::HeaderValue;
/// use trellis_middleware::FnMiddleware;
///
/// let powered_by = FnMiddleware::new("powered_by", |req, next| {
///     Box::pin(async move {
///         let mut response = next.run(req).await;
///         response
///             .headers_mut()
///             .insert("x-powered-by", HeaderValue::from_static("trellis"));
///         response
///     })
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> BoxFuture<'a, Response> + Send + Sync + 'static,
{
    /// Creates a new function-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> BoxFuture<'a, Response> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        (self.func)(request, next)
    }
}
