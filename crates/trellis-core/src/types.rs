//! Request and response aliases shared by every crate.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderValue, StatusCode};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;

/// A fully buffered request.
pub type Request = http::Request<Full<Bytes>>;

/// A fully buffered response.
pub type Response = http::Response<Full<Bytes>>;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Constructors for the responses the routing core produces itself.
pub trait ResponseExt {
    /// A `text/plain` response.
    fn text(status: StatusCode, body: &str) -> Response;

    /// A JSON error in the `{"error":{"code","message"}}` envelope.
    fn json_error(status: StatusCode, code: &str, message: &str) -> Response;

    /// An empty redirect to `location`.
    fn redirect(status: StatusCode, location: HeaderValue) -> Response;
}

impl ResponseExt for Response {
    fn text(status: StatusCode, body: &str) -> Response {
        buffered(status, Some("text/plain; charset=utf-8"), Bytes::copy_from_slice(body.as_bytes()))
    }

    fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
        let envelope = serde_json::json!({ "error": { "code": code, "message": message } });
        buffered(status, Some("application/json"), Bytes::from(envelope.to_string()))
    }

    fn redirect(status: StatusCode, location: HeaderValue) -> Response {
        let mut response = buffered(status, None, Bytes::new());
        response.headers_mut().insert(LOCATION, location);
        response
    }
}

fn buffered(status: StatusCode, content_type: Option<&'static str>, body: Bytes) -> Response {
    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_text() {
        let response = Response::text(StatusCode::NOT_FOUND, "Not Found");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(body(response).await, "Not Found");
    }

    #[tokio::test]
    async fn test_json_error_envelope() {
        let response = Response::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "missing_action",
            "no action registered",
        );
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let json: serde_json::Value = serde_json::from_str(&body(response).await).unwrap();
        assert_eq!(json["error"]["code"], "missing_action");
        assert_eq!(json["error"]["message"], "no action registered");
    }

    #[test]
    fn test_redirect_has_location_and_no_content_type() {
        let response = Response::redirect(StatusCode::FOUND, HeaderValue::from_static("/login"));
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/login");
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }
}
