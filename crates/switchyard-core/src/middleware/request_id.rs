//! Request ID middleware
//!
//! Tags every request with a `request_id` attribute and echoes it back in the
//! `x-request-id` response header. An incoming `x-request-id` header is
//! reused instead of generating a fresh UUID.

use super::queue::{Middleware, MiddlewareQueue};
use crate::error::Result;
use crate::request::Request;
use crate::response::Response;
use http::HeaderValue;
use uuid::Uuid;

/// Attribute name the request ID is stored under
pub const REQUEST_ID_ATTRIBUTE: &str = "request_id";

/// Header carrying the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that assigns request IDs
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdMiddleware;

impl RequestIdMiddleware {
    /// Create the middleware
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestIdMiddleware {
    fn process(&self, req: Request, next: &mut MiddlewareQueue<'_>) -> Result<Response> {
        let id = req
            .header(REQUEST_ID_HEADER)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut response = next.handle(req.with_attribute(REQUEST_ID_ATTRIBUTE, id.as_str()))?;
        if let Ok(value) = HeaderValue::from_str(&id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        Ok(response)
    }
}
