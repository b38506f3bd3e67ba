//! View error types

use std::path::PathBuf;
use switchyard_core::ApiError;

/// Error raised while locating or rendering a view
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// Tera failed to parse or render a template
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    /// A template file could not be read
    #[error("failed to read template {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The view path escapes the views root or is otherwise unusable
    #[error("invalid view path \"{0}\"")]
    InvalidView(String),

    /// The view has no entry file
    #[error("view \"{0}\" not found")]
    NotFound(String),

    /// Bindings could not be turned into a template context
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The template cache lock was poisoned by a panicking render
    #[error("template cache poisoned")]
    Poisoned,
}

impl ViewError {
    /// Create a serialization error
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::NotFound(view) => ApiError::not_found(format!("View \"{}\" not found", view)),
            other => ApiError::internal("View rendering failed").with_internal(other.to_string()),
        }
    }
}
