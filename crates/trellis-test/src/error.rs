//! Harness failures, as opposed to assertion failures.

use thiserror::Error;

/// Something went wrong driving an endpoint, before any assertion ran.
#[derive(Debug, Error)]
pub enum TestError {
    /// `http::Request::builder` rejected the method, URI or a header.
    #[error("could not build request: {0}")]
    RequestBuild(String),

    /// The body stream failed or was not text.
    #[error("could not read body: {0}")]
    BodyRead(String),

    /// Encoding a request body or decoding a response body.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
