//! Test client for in-memory requests.

use crate::error::TestError;
use crate::response::TestResponse;
use bytes::Bytes;
use http::{header, Method};
use http_body_util::Full;
use std::sync::Arc;
use trellis_core::{BoxedEndpoint, Endpoint};

/// Sends requests straight to an endpoint.
///
/// # Example
///
/// ```ignore
/// let client = TestClient::new(app);
/// let response = client.get("/posts").header("Accept", "text/html").send().await;
/// assert_eq!(response.status_code(), 200);
/// ```
#[must_use]
pub struct TestClient {
    endpoint: BoxedEndpoint,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for `endpoint`.
    pub fn new(endpoint: impl Endpoint) -> Self {
        Self::from_arc(Arc::new(endpoint))
    }

    /// Creates a client for an already shared endpoint.
    pub fn from_arc(endpoint: BoxedEndpoint) -> Self {
        Self {
            endpoint,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Creates a GET request.
    pub fn get(&self, uri: impl Into<String>) -> TestRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request.
    pub fn post(&self, uri: impl Into<String>) -> TestRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a PUT request.
    pub fn put(&self, uri: impl Into<String>) -> TestRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Creates a PATCH request.
    pub fn patch(&self, uri: impl Into<String>) -> TestRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Creates a DELETE request.
    pub fn delete(&self, uri: impl Into<String>) -> TestRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Creates a HEAD request.
    pub fn head(&self, uri: impl Into<String>) -> TestRequest<'_> {
        self.request(Method::HEAD, uri)
    }

    /// Creates an OPTIONS request.
    pub fn options(&self, uri: impl Into<String>) -> TestRequest<'_> {
        self.request(Method::OPTIONS, uri)
    }

    /// Creates a request with any method.
    pub fn request(&self, method: Method, uri: impl Into<String>) -> TestRequest<'_> {
        TestRequest {
            client: self,
            method,
            uri: uri.into(),
            headers: self.default_headers.clone(),
            body: Bytes::new(),
            error: None,
        }
    }
}

/// A request being built against a [`TestClient`].
#[must_use = "requests do nothing until sent"]
pub struct TestRequest<'a> {
    client: &'a TestClient,
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequest<'_> {
    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes `value` as the JSON body and sets `Content-Type`.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = Bytes::from(bytes);
                self.header(header::CONTENT_TYPE.as_str(), "application/json")
            }
            Err(e) => {
                self.error = Some(TestError::Json(e));
                self
            }
        }
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request, returning build and body errors.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let mut builder = http::Request::builder().method(self.method).uri(&self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder
            .body(Full::new(self.body))
            .map_err(|e| TestError::RequestBuild(e.to_string()))?;

        let response = self.client.endpoint.call(request).await;
        TestResponse::from_http(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;
    use trellis_core::{endpoint_fn, Request, Response, ResponseExt};

    fn echo() -> TestClient {
        TestClient::new(endpoint_fn(|req: Request| async move {
            let body = json!({
                "method": req.method().as_str(),
                "path": req.uri().path(),
                "query": req.uri().query(),
                "custom": req.headers().get("x-custom").and_then(|v| v.to_str().ok()),
                "content_type": req.headers().get("content-type").and_then(|v| v.to_str().ok()),
            });
            let mut response = Response::text(StatusCode::OK, &body.to_string());
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                http::HeaderValue::from_static("application/json"),
            );
            response
        }))
    }

    #[tokio::test]
    async fn test_methods_and_paths() {
        let client = echo();

        let get = client.get("/posts?page=2").send().await;
        let body = get.json_value().unwrap();
        assert_eq!(body["method"], "GET");
        assert_eq!(body["path"], "/posts");
        assert_eq!(body["query"], "page=2");

        let delete = client.delete("/posts/1").send().await;
        assert_eq!(delete.json_value().unwrap()["method"], "DELETE");

        let custom = client.request(Method::PUT, "/x").send().await;
        assert_eq!(custom.json_value().unwrap()["method"], "PUT");
    }

    #[tokio::test]
    async fn test_default_headers() {
        let client = echo().with_default_header("X-Custom", "default-value");
        let response = client.get("/").send().await;
        assert_eq!(response.json_value().unwrap()["custom"], "default-value");
    }

    #[tokio::test]
    async fn test_json_body_sets_content_type() {
        let client = echo();
        let response = client.post("/posts").json(&json!({"title": "Hello"})).send().await;
        assert_eq!(response.json_value().unwrap()["content_type"], "application/json");
    }

    #[tokio::test]
    async fn test_invalid_uri() {
        let client = echo();
        let result = client.get("not a uri").try_send().await;
        assert!(matches!(result, Err(TestError::RequestBuild(_))));
    }
}
