//! # Trellis Core
//!
//! Core types and contracts shared by the Trellis routing crates:
//!
//! - [`Request`] / [`Response`] - the HTTP types routed end to end
//! - [`Endpoint`] - the single "handle a request, return a response" contract
//! - [`RoutingError`] / [`ResolveError`] - configuration-time and resolution errors
//! - [`registry`] - the per-slice component registry contract and [`Container`]

#![doc(html_root_url = "https://docs.rs/trellis-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod endpoint;
mod error;
pub mod registry;
mod types;

pub use endpoint::{endpoint_fn, BoxedEndpoint, Endpoint, FnEndpoint};
pub use error::{ResolveError, RoutingError, RoutingResult};
pub use registry::{Component, ComponentRegistry, Container, RegistryError};
pub use types::{BoxFuture, Request, Response, ResponseExt};
