//! Response types for Switchyard
//!
//! This module provides types for building HTTP responses. The core trait is
//! [`IntoResponse`], which allows any type to be converted into an HTTP response.
//!
//! # Built-in Response Types
//!
//! | Type | Status | Content-Type | Description |
//! |------|--------|--------------|-------------|
//! | `String` / `&str` | 200 | text/plain | Plain text response |
//! | [`Json<T>`] | 200 | application/json | JSON response |
//! | [`Html<T>`] | 200 | text/html | HTML response |
//! | [`NoContent`] | 204 | - | No content response |
//! | [`Redirect`] | 3xx | - | HTTP redirect |
//! | `(StatusCode, R)` | varies | from `R` | Custom status code |
//! | [`ApiError`] | varies | application/json | Error response |
//!
//! Handlers that write into an [`Output`](crate::Output) instead of returning
//! one of these get a `text/html` response built from what they wrote.

use crate::error::{get_environment, ApiError, ErrorResponse};
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;

/// HTTP Response type
pub type Response = http::Response<Bytes>;

pub(crate) const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub(crate) const TEXT_HTML: &str = "text/html; charset=utf-8";
pub(crate) const APPLICATION_JSON: &str = "application/json";

/// Build a response with an optional content type.
pub(crate) fn build(status: StatusCode, content_type: Option<&'static str>, body: Bytes) -> Response {
    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

/// Trait for types that can be converted into an HTTP response
pub trait IntoResponse {
    /// Convert self into a Response
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        build(StatusCode::OK, Some(TEXT_PLAIN), Bytes::from_static(self.as_bytes()))
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        build(StatusCode::OK, Some(TEXT_PLAIN), Bytes::from(self))
    }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        build(self, None, Bytes::new())
    }
}

// (StatusCode, impl IntoResponse)
impl<R: IntoResponse> IntoResponse for (StatusCode, R) {
    fn into_response(self) -> Response {
        let mut response = self.1.into_response();
        *response.status_mut() = self.0;
        response
    }
}

// (StatusCode, HeaderMap, impl IntoResponse)
impl<R: IntoResponse> IntoResponse for (StatusCode, HeaderMap, R) {
    fn into_response(self) -> Response {
        let mut response = self.2.into_response();
        *response.status_mut() = self.0;
        response.headers_mut().extend(self.1);
        response
    }
}

// Internal details are masked according to SWITCHYARD_ENV
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let error_response = ErrorResponse::from_error(self, get_environment());
        let body = serde_json::to_vec(&error_response).unwrap_or_else(|_| {
            br#"{"error":{"type":"internal_error","message":"Failed to serialize error"}}"#.to_vec()
        });
        build(status, Some(APPLICATION_JSON), Bytes::from(body))
    }
}

/// JSON response wrapper
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => build(StatusCode::OK, Some(APPLICATION_JSON), Bytes::from(body)),
            Err(err) => ApiError::internal(format!("Failed to serialize response: {}", err))
                .into_response(),
        }
    }
}

/// HTML response wrapper
#[derive(Debug, Clone)]
pub struct Html<T>(pub T);

impl<T: Into<String>> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        build(StatusCode::OK, Some(TEXT_HTML), Bytes::from(self.0.into()))
    }
}

/// 204 No Content response
#[derive(Debug, Clone, Copy)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        build(StatusCode::NO_CONTENT, None, Bytes::new())
    }
}

/// Redirect response
#[derive(Debug, Clone)]
pub struct Redirect {
    status: StatusCode,
    location: HeaderValue,
}

impl Redirect {
    /// Create a 302 Found redirect
    pub fn to(uri: &str) -> Result<Self, ApiError> {
        Self::with_status(StatusCode::FOUND, uri)
    }

    /// Create a 301 Permanent redirect
    pub fn permanent(uri: &str) -> Result<Self, ApiError> {
        Self::with_status(StatusCode::MOVED_PERMANENTLY, uri)
    }

    fn with_status(status: StatusCode, uri: &str) -> Result<Self, ApiError> {
        let location = HeaderValue::from_str(uri)
            .map_err(|_| ApiError::internal("Invalid redirect URI").with_internal(uri.to_string()))?;
        Ok(Self { status, location })
    }
}

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        let mut response = build(self.status, None, Bytes::new());
        response.headers_mut().insert(header::LOCATION, self.location);
        response
    }
}
