//! TestClient for dispatching requests without network binding
//!
//! Requests go through the full `Router::dispatch` pipeline (global
//! middleware, routes, controllers, views, not-found), exactly as the server
//! adapter would run them, minus the socket.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_core::{Request, Router, TestClient};
//!
//! let mut router = Router::new();
//! router.get("/", |_req: Request| "Hello, World!")?;
//!
//! let client = TestClient::new(router);
//! client.get("/").assert_status(200).assert_body_contains("Hello");
//! ```

use crate::error::Result;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Test client over a configured router
#[derive(Clone)]
pub struct TestClient {
    router: Arc<Router>,
}

impl TestClient {
    /// Create a new test client
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    /// Send a GET request
    pub fn get(&self, path: &str) -> TestResponse {
        self.request(TestRequest::get(path))
    }

    /// Send a POST request with a JSON body
    pub fn post_json<T: Serialize>(&self, path: &str, body: &T) -> TestResponse {
        self.request(TestRequest::post(path).json(body))
    }

    /// Send a POST request with a URL-encoded form body
    pub fn post_form<T: Serialize + ?Sized>(&self, path: &str, form: &T) -> TestResponse {
        self.request(TestRequest::post(path).form(form))
    }

    /// Send a request; dispatch faults become their error response
    pub fn request(&self, req: TestRequest) -> TestResponse {
        match self.try_request(req) {
            Ok(response) => response,
            Err(err) => TestResponse::from_response(err.into_response()),
        }
    }

    /// Send a request, keeping dispatch faults as errors
    ///
    /// # Errors
    ///
    /// A body that cannot be parsed, or any fault raised during dispatch.
    pub fn try_request(&self, req: TestRequest) -> Result<TestResponse> {
        let mut parts = http::Request::new(()).into_parts().0;
        parts.method = req.method;
        parts.uri = req
            .path
            .parse()
            .map_err(|_| crate::ApiError::bad_request(format!("Invalid request target: {}", req.path)))?;
        parts.headers = req.headers;

        let request = Request::from_parts(parts, req.body.unwrap_or_default())?;
        let response = self.router.dispatch(request)?;
        Ok(TestResponse::from_response(response))
    }
}

/// Test request builder
#[derive(Debug, Clone)]
pub struct TestRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl TestRequest {
    /// Create a new request with the given method and path
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a PUT request
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Create a PATCH request
    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Create a DELETE request
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a header; invalid names or values are ignored
    pub fn header(mut self, key: &str, value: &str) -> Self {
        if let (Ok(name), Ok(val)) = (key.parse::<header::HeaderName>(), HeaderValue::from_str(value)) {
            self.headers.insert(name, val);
        }
        self
    }

    /// Set a JSON body and `Content-Type: application/json`
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        if let Ok(bytes) = serde_json::to_vec(body) {
            self.body = Some(Bytes::from(bytes));
            self.headers
                .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        self
    }

    /// Set a URL-encoded form body
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        if let Ok(encoded) = serde_urlencoded::to_string(form) {
            self.body = Some(Bytes::from(encoded));
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }
        self
    }

    /// Set a raw body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the Content-Type header
    pub fn content_type(self, content_type: &str) -> Self {
        self.header("content-type", content_type)
    }
}

/// Test response with assertion helpers
#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    fn from_response(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Get the response status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the response body as bytes
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get the response body as a string (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Parse the response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Assert the status code
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status<S: Into<u16>>(&self, expected: S) -> &Self {
        let expected = expected.into();
        assert_eq!(
            self.status.as_u16(),
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Assert a header value
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, key: &str, expected: &str) -> &Self {
        let actual = self.headers.get(key).and_then(|v| v.to_str().ok()).unwrap_or("");
        assert_eq!(
            actual, expected,
            "Expected header '{}' to be '{}', got '{}'",
            key, expected, actual
        );
        self
    }

    /// Assert the exact body text
    ///
    /// # Panics
    ///
    /// Panics if the body differs.
    pub fn assert_body(&self, expected: &str) -> &Self {
        assert_eq!(self.text(), expected, "Body mismatch");
        self
    }

    /// Assert that the body contains `expected`
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't contain the expected string.
    pub fn assert_body_contains(&self, expected: &str) -> &Self {
        let body = self.text();
        assert!(
            body.contains(expected),
            "Expected body to contain '{}', got '{}'",
            expected,
            body
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use serde_json::{json, Value};

    fn client() -> TestClient {
        let mut router = Router::new();
        router.get("/", |_req: Request| "Hello, World!").unwrap();
        router
            .post("/echo", |req: Request| {
                crate::response::Json(req.body().cloned().unwrap_or(Value::Null))
            })
            .unwrap();
        router
            .get("/fail", |_req: Request| -> Result<&'static str> { Err(ApiError::internal("broken")) })
            .unwrap();
        TestClient::new(router)
    }

    #[test]
    fn test_get() {
        client()
            .get("/")
            .assert_status(200u16)
            .assert_header("content-type", "text/plain; charset=utf-8")
            .assert_body("Hello, World!");
    }

    #[test]
    fn test_json_body() {
        let response = client().post_json("/echo", &json!({"a": 1}));
        response.assert_status(StatusCode::OK);
        assert_eq!(response.json::<Value>().unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_form_body() {
        let response = client().post_form("/echo", &[("csrf_token", "t"), ("n", "1")]);
        assert_eq!(response.json::<Value>().unwrap(), json!({"csrf_token": "t", "n": "1"}));
    }

    #[test]
    fn test_fault_as_error_or_response() {
        let client = client();
        let err = client.try_request(TestRequest::get("/fail")).unwrap_err();
        assert_eq!(err.message, "broken");

        client.get("/fail").assert_status(500u16);
    }

    #[test]
    fn test_unmatched_is_404() {
        client().get("/missing").assert_status(404u16).assert_body("404 Not Found");
    }
}
