//! Tracing middleware
//!
//! Opens an `http_request` span per dispatch carrying method, path, request
//! ID, status and duration, and logs completion inside it.

use super::queue::{Middleware, MiddlewareQueue};
use super::request_id::REQUEST_ID_ATTRIBUTE;
use crate::error::Result;
use crate::request::Request;
use crate::response::Response;
use std::time::Instant;
use tracing::{info_span, Level};

/// Middleware that creates tracing spans for requests
///
/// Place it after [`RequestIdMiddleware`](super::RequestIdMiddleware) to get
/// the request ID into the span.
///
/// # Example
///
/// ```rust,ignore
/// use switchyard_core::middleware::TracingMiddleware;
///
/// router.add_middleware(TracingMiddleware::new().with_field("service", "blog"));
/// ```
#[derive(Clone)]
pub struct TracingMiddleware {
    level: Level,
    custom_fields: Vec<(String, String)>,
}

impl TracingMiddleware {
    /// Create a TracingMiddleware logging completions at INFO
    pub fn new() -> Self {
        Self::with_level(Level::INFO)
    }

    /// Create a TracingMiddleware with a specific completion level
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            custom_fields: Vec::new(),
        }
    }

    /// Add a custom field to the completion event
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_fields.push((key.into(), value.into()));
        self
    }

    fn fields(&self) -> String {
        self.custom_fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TracingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for TracingMiddleware {
    fn process(&self, req: Request, next: &mut MiddlewareQueue<'_>) -> Result<Response> {
        let method = req.method().to_string();
        let path = req.path().to_string();
        let request_id = req.param(REQUEST_ID_ATTRIBUTE).unwrap_or("unknown").to_string();
        let fields = self.fields();

        let span = info_span!(
            "http_request",
            method = %method,
            path = %path,
            request_id = %request_id,
            status = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );
        let _enter = span.enter();
        let start = Instant::now();

        let result = next.handle(req);
        let duration_ms = start.elapsed().as_millis() as u64;
        span.record("duration_ms", duration_ms);

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(status = err.status.as_u16(), error = %err, duration_ms, "Request failed");
                return Err(err);
            }
        };

        let status = response.status();
        span.record("status", status.as_u16());

        if status.is_client_error() || status.is_server_error() {
            tracing::warn!(status = status.as_u16(), duration_ms, fields = %fields, "Request completed with error status");
            return Ok(response);
        }

        match self.level {
            Level::TRACE => tracing::trace!(status = status.as_u16(), duration_ms, fields = %fields, "Request completed"),
            Level::DEBUG => tracing::debug!(status = status.as_u16(), duration_ms, fields = %fields, "Request completed"),
            Level::INFO => tracing::info!(status = status.as_u16(), duration_ms, fields = %fields, "Request completed"),
            Level::WARN => tracing::warn!(status = status.as_u16(), duration_ms, fields = %fields, "Request completed"),
            Level::ERROR => tracing::error!(status = status.as_u16(), duration_ms, fields = %fields, "Request completed"),
        }
        Ok(response)
    }
}
