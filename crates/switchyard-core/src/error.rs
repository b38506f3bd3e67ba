//! Error types for Switchyard
//!
//! Two families live here. [`RouteError`] covers configuration mistakes that
//! are reported while routes are being registered. [`ApiError`] covers faults
//! raised while a request is being handled; those propagate out of
//! `Router::dispatch` instead of being turned into a 404.

use http::StatusCode;
use serde::Serialize;
use std::fmt;

/// Result type alias for Switchyard operations
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Error raised while a request is being handled
///
/// Carries the status a transport should answer with if it decides to turn
/// the fault into a response.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,
    /// Error type identifier
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    /// Internal details (hidden in production)
    pub(crate) internal: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            message: message.into(),
            internal: None,
        }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// Create a 403 Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    /// Create a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// Create a 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    /// Add internal details (for logging, hidden from response in prod)
    pub fn with_internal(mut self, details: impl Into<String>) -> Self {
        self.internal = Some(details.into());
        self
    }

    /// Internal details attached with [`ApiError::with_internal`]
    pub fn internal_details(&self) -> Option<&str> {
        self.internal.as_deref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for ApiError {}

/// JSON representation of API error response
#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub(crate) fn from_error(err: ApiError, environment: Environment) -> Self {
        // Internal details never leave the process in production.
        let details = match environment {
            Environment::Production => None,
            Environment::Development => err.internal,
        };
        Self {
            error: ErrorBody {
                error_type: err.error_type,
                message: err.message,
                details,
            },
        }
    }
}

/// Deployment profile that decides how much of an error is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Verbose errors
    Development,
    /// Internal details are masked
    Production,
}

impl Environment {
    /// Read the profile from `SWITCHYARD_ENV` ("production"/"prod" or anything else)
    pub fn current() -> Self {
        match std::env::var("SWITCHYARD_ENV").as_deref() {
            Ok("production") | Ok("prod") => Self::Production,
            _ => Self::Development,
        }
    }
}

/// Get the current environment profile
pub fn get_environment() -> Environment {
    Environment::current()
}

// Conversion from common error types
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

impl From<serde_urlencoded::de::Error> for ApiError {
    fn from(err: serde_urlencoded::de::Error) -> Self {
        ApiError::bad_request(format!("Invalid form body: {}", err))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::internal("I/O error").with_internal(err.to_string())
    }
}

impl From<std::fmt::Error> for ApiError {
    fn from(err: std::fmt::Error) -> Self {
        ApiError::internal("Failed to write output").with_internal(err.to_string())
    }
}

impl From<hyper::Error> for ApiError {
    fn from(err: hyper::Error) -> Self {
        ApiError::internal("HTTP error").with_internal(err.to_string())
    }
}

/// Error returned when a route cannot be registered
///
/// Route patterns are checked when they are added so that a malformed table
/// fails at startup rather than on the first request that reaches it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// `{` without a matching `}`
    #[error("unclosed brace '{{' in route pattern (missing closing '}}'): \"{pattern}\"")]
    UnclosedBrace { pattern: String },

    /// `}` without a preceding `{`
    #[error("unmatched closing brace '}}' at position {position} in route pattern: \"{pattern}\"")]
    UnmatchedClosingBrace { pattern: String, position: usize },

    /// `{{` inside a placeholder
    #[error("nested braces are not allowed in route pattern at position {position}: \"{pattern}\"")]
    NestedBraces { pattern: String, position: usize },

    /// `{}`
    #[error("empty parameter name '{{}}' at position {position} in route pattern: \"{pattern}\"")]
    EmptyParameterName { pattern: String, position: usize },

    /// Parameter name with characters outside `[A-Za-z0-9_]` or a leading digit
    #[error("invalid parameter name '{{{name}}}' in route pattern - parameter names must be identifiers: \"{pattern}\"")]
    InvalidParameterName { pattern: String, name: String },

    /// The same name used twice in one pattern
    #[error("duplicate parameter name '{{{name}}}' in route pattern: \"{pattern}\"")]
    DuplicateParameterName { pattern: String, name: String },

    /// Two placeholders with no literal between them (`{a}{b}`)
    #[error("adjacent parameters '{{{first}}}{{{second}}}' are ambiguous in route pattern: \"{pattern}\"")]
    AdjacentParameters {
        pattern: String,
        first: String,
        second: String,
    },

    /// The HTTP method is not a valid token
    #[error("invalid HTTP method \"{method}\"")]
    InvalidMethod { method: String },

    /// The compiled matcher was rejected by the regex engine
    #[error("failed to compile route pattern \"{pattern}\": {details}")]
    Compile { pattern: String, details: String },
}
