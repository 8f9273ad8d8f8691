//! # Trellis Middleware
//!
//! Insertion-aware middleware stack for the Trellis routing core.
//!
//! Middleware is declared while routes are defined and frozen into a linear
//! chain before the first request is served:
//!
//! ```text
//! Request → logger → session → csrf → ... → router
//!                                              ↓
//! Response ← logger ← session ← csrf ← ... ←───┘
//! ```
//!
//! Entries are appended by default, or spliced `before`/`after` another entry
//! by identifier. An anchor that never appears is a configuration error raised
//! when the stack is frozen.
//!
//! ## Example
//!
//! ```
//! use trellis_middleware::{FnMiddleware, MiddlewareStack, Position};
//!
//! let mut stack = MiddlewareStack::new();
//! stack.use_middleware("", FnMiddleware::new("session", |req, next| Box::pin(next.run(req))), Position::Append);
//! stack.use_middleware("", FnMiddleware::new("csrf", |req, next| Box::pin(next.run(req))), Position::Append);
//! stack.use_middleware("", FnMiddleware::new("logger", |req, next| Box::pin(next.run(req))), Position::before("session"));
//!
//! assert_eq!(stack.ordered_ids("").unwrap(), vec!["logger", "session", "csrf"]);
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod middleware;
pub mod stack;

// Re-export main types at crate root
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use stack::{BoxedMiddleware, Chain, MiddlewareEntry, MiddlewareStack, Position, ScopedChains};
pub use trellis_core::{Request, Response, ResponseExt};
