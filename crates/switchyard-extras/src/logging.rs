//! Request/response logging middleware
//!
//! Logs every dispatched request through `tracing`, picking up the request
//! ID set by `RequestIdMiddleware` when it runs earlier in the chain.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//! use switchyard_extras::{LogFormat, LoggingMiddleware};
//!
//! let mut router = Router::new();
//! router.add_middleware(RequestIdMiddleware::new());
//! router.add_middleware(LoggingMiddleware::new().format(LogFormat::Json));
//! ```

use std::time::Instant;
use switchyard_core::middleware::REQUEST_ID_ATTRIBUTE;
use switchyard_core::{normalize_path, Middleware, MiddlewareQueue, Request, Response, Result};

/// Logging format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per request
    #[default]
    Compact,
    /// Separate request and response lines, optionally with headers
    Detailed,
    /// JSON objects in the log message
    Json,
}

/// Logging configuration
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Logging format
    pub format: LogFormat,
    /// Whether to log request headers (detailed format only)
    pub log_request_headers: bool,
    /// Whether to log response headers (detailed format only)
    pub log_response_headers: bool,
    /// Normalized path prefixes that are not logged
    pub skip_paths: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Compact,
            log_request_headers: false,
            log_response_headers: false,
            skip_paths: vec!["health".to_string(), "metrics".to_string()],
        }
    }
}

/// Logging middleware
#[derive(Clone, Debug, Default)]
pub struct LoggingMiddleware {
    config: LoggingConfig,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new logging middleware with custom configuration
    pub fn with_config(config: LoggingConfig) -> Self {
        Self { config }
    }

    /// Set the logging format
    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Enable request header logging
    pub fn log_request_headers(mut self, enabled: bool) -> Self {
        self.config.log_request_headers = enabled;
        self
    }

    /// Enable response header logging
    pub fn log_response_headers(mut self, enabled: bool) -> Self {
        self.config.log_response_headers = enabled;
        self
    }

    /// Add a path to skip logging. Given as a URL path or already normalized.
    pub fn skip_path(mut self, path: &str) -> Self {
        self.config.skip_paths.push(normalize_path(path));
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Whether requests to `path` (normalized) are left unlogged
    pub fn skips(&self, path: &str) -> bool {
        self.config.skip_paths.iter().any(|skip| {
            path == skip || path.strip_prefix(skip.as_str()).is_some_and(|rest| rest.starts_with('/'))
        })
    }

    fn log_request(&self, req: &Request, request_id: &str) {
        let method = req.method().as_str();
        let path = req.path();
        match self.config.format {
            LogFormat::Compact => {}
            LogFormat::Detailed => {
                tracing::info!(request_id, method, path, "=== Incoming Request ===");
                if self.config.log_request_headers {
                    for (name, value) in req.headers() {
                        if let Ok(val) = value.to_str() {
                            tracing::debug!(request_id, header = %name, value = val, "request header");
                        }
                    }
                }
            }
            LogFormat::Json => {
                let json = serde_json::json!({
                    "type": "request",
                    "request_id": request_id,
                    "method": method,
                    "path": path,
                });
                tracing::info!("{}", json);
            }
        }
    }

    fn log_outcome(&self, method: &str, path: &str, request_id: &str, result: &Result<Response>, started: Instant) {
        let duration_ms = started.elapsed().as_millis() as u64;
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(request_id, method, path, duration_ms, error = %err, "request failed");
                return;
            }
        };
        let status = response.status().as_u16();

        match self.config.format {
            LogFormat::Compact => {
                tracing::info!(request_id, method, path, status, duration_ms, "request completed");
            }
            LogFormat::Detailed => {
                tracing::info!(request_id, status, duration_ms, "=== Response Sent ===");
                if self.config.log_response_headers {
                    for (name, value) in response.headers() {
                        if let Ok(val) = value.to_str() {
                            tracing::debug!(request_id, header = %name, value = val, "response header");
                        }
                    }
                }
            }
            LogFormat::Json => {
                let json = serde_json::json!({
                    "type": "response",
                    "request_id": request_id,
                    "method": method,
                    "path": path,
                    "status": status,
                    "duration_ms": duration_ms,
                });
                tracing::info!("{}", json);
            }
        }
    }
}

impl Middleware for LoggingMiddleware {
    fn process(&self, req: Request, next: &mut MiddlewareQueue<'_>) -> Result<Response> {
        if self.skips(req.path()) {
            return next.handle(req);
        }

        let method = req.method().to_string();
        let path = req.path().to_string();
        let request_id = req
            .attributes()
            .get_str(REQUEST_ID_ATTRIBUTE)
            .unwrap_or("N/A")
            .to_string();

        self.log_request(&req, &request_id);
        let started = Instant::now();
        let result = next.handle(req);
        self.log_outcome(&method, &path, &request_id, &result, started);
        result
    }
}
