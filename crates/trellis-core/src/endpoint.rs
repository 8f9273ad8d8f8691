//! The callable contract every route target resolves to.

use crate::types::{BoxFuture, Request, Response};
use std::future::Future;
use std::sync::Arc;

/// Something that handles a request and returns a response.
///
/// Actions stored in a component registry, mounted sub-applications, frozen
/// middleware chains and the routing application itself all implement this
/// single-method contract.
pub trait Endpoint: Send + Sync + 'static {
    /// Handles a request.
    fn call(&self, request: Request) -> BoxFuture<'_, Response>;
}

/// A shared, type-erased endpoint.
pub type BoxedEndpoint = Arc<dyn Endpoint>;

impl<E: Endpoint + ?Sized> Endpoint for Arc<E> {
    fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        (**self).call(request)
    }
}

/// An endpoint backed by an async function.
///
/// # Example
///
/// ```
/// use trellis_core::{endpoint_fn, Endpoint, Response, ResponseExt};
/// use http::StatusCode;
///
/// let ok = endpoint_fn(|_req| async { Response::text(StatusCode::OK, "ok") });
/// # let _ = ok;
/// ```
pub struct FnEndpoint<F> {
    func: F,
}

impl<F, Fut> Endpoint for FnEndpoint<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, request: Request) -> BoxFuture<'_, Response> {
        Box::pin((self.func)(request))
    }
}

/// Wraps an async function as an [`Endpoint`].
pub fn endpoint_fn<F, Fut>(func: F) -> FnEndpoint<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FnEndpoint { func }
}
