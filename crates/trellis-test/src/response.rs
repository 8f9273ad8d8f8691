//! Buffered responses and the assertions route tests lean on.

use crate::error::TestError;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body_util::BodyExt;
use std::fmt;

/// A response whose body has been read to the end.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Drains `response` into memory.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: BodyExt,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let collected = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?;
        Ok(Self::new(parts.status, parts.headers, collected.to_bytes()))
    }

    /// Assembles a response by hand.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self { status, headers, body }
    }

    /// The status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The status as a bare number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// The headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header as text. `None` when absent or not visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// The raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body decoded as UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("body is not UTF-8: {e}")))
    }

    /// The body parsed as JSON.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// # Panics
    ///
    /// When the status is not `expected`. The body is included in the message.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        if self.status != expected {
            panic!(
                "expected status {expected}, got {} ({})",
                self.status,
                String::from_utf8_lossy(&self.body)
            );
        }
        self
    }

    /// # Panics
    ///
    /// When header `name` is missing or not `expected`.
    #[track_caller]
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let actual = self.header(name);
        if actual != Some(expected) {
            panic!("expected {name}: {expected:?}, got {actual:?}");
        }
        self
    }

    /// # Panics
    ///
    /// When the body is not exactly `expected`.
    #[track_caller]
    pub fn assert_text(&self, expected: &str) -> &Self {
        let body = String::from_utf8_lossy(&self.body);
        if body != expected {
            panic!("expected body {expected:?}, got {body:?}");
        }
        self
    }
}
