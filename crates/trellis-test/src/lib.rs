//! # Trellis Test
//!
//! In-memory testing for anything that implements
//! [`Endpoint`](trellis_core::Endpoint): a frozen routing application, a
//! middleware chain, or a single action. No sockets, no server.
//!
//! ## Example
//!
//! ```rust
//! use trellis_core::{endpoint_fn, Response, ResponseExt};
//! use trellis_test::TestClient;
//! use http::StatusCode;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let client = TestClient::new(endpoint_fn(|req| async move {
//!     Response::text(StatusCode::OK, req.uri().path())
//! }));
//!
//! let response = client.get("/posts/1").send().await;
//! response.assert_status(StatusCode::OK);
//! assert_eq!(response.text().unwrap(), "/posts/1");
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod response;

pub use client::{TestClient, TestRequest};
pub use error::TestError;
pub use response::TestResponse;
