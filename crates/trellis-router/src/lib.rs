//! Radix tree path router for Trellis.
//!
//! This crate is the verb + path matcher the routing core wraps. It knows
//! nothing about resources, scopes or endpoints: it stores handlers of any
//! type `T` and hands them back with the extracted path parameters.
//!
//! # Features
//!
//! - **Radix Tree Matching**: O(k) path lookup
//! - **Path Parameters**: `:name` segments (`/posts/:id`)
//! - **Wildcards**: catch-all routes (`/admin/*path`)
//! - **Method-Based Routing**: different handlers per HTTP method, HEAD
//!   answered by GET, and an `any` fallback slot
//!
//! # Example
//!
//! ```rust
//! use trellis_router::{MethodRouter, PathRouter};
//! use http::Method;
//!
//! let mut router = PathRouter::new();
//! router.insert("/cafes/:id", MethodRouter::new().get("cafes.show")).unwrap();
//! router.insert("/cafes/:cafe_id/reviews", MethodRouter::new().get("cafes.reviews.index")).unwrap();
//!
//! let found = router.match_route(&Method::GET, "/cafes/9/reviews").unwrap();
//! assert_eq!(*found.handler, "cafes.reviews.index");
//! assert_eq!(found.params.get("cafe_id"), Some("9"));
//! ```
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!              ┌───────┴───────┐
//!              │               │
//!           "cafes"         "admin"
//!              │               │
//!        ┌─────┴─────┐      "*path"
//!        │           │
//!      ":id"    ":cafe_id"
//!     [GET]          │
//!                "reviews"
//!                  [GET]
//! ```

mod error;
mod method_router;
mod node;
mod params;
mod router;

pub use error::PathError;
pub use method_router::MethodRouter;
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::PathRouter;

/// A matched route with its handler and extracted parameters.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    /// The handler registered for the matched verb + path
    pub handler: &'a T,
    /// Extracted path parameters
    pub params: Params,
}

impl<'a, T> RouteMatch<'a, T> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(handler: &'a T, params: Params) -> Self {
        Self { handler, params }
    }
}
