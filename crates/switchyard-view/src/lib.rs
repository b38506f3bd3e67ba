//! # switchyard-view
//!
//! File-backed views for the Switchyard router.
//!
//! When no route or controller handles a request, the router asks its view
//! source whether a view named after the path exists. [`TemplateViews`]
//! answers from a directory: view `blog/archive` is the file
//! `{root}/blog/archive/index.html`, rendered between a shared header and
//! footer with Tera.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//! use switchyard_view::{TemplateViews, ViewsConfig};
//!
//! let mut router = Router::new();
//! router.with_views(TemplateViews::with_config(
//!     ViewsConfig::new("views").auto_reload(false),
//! ));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod templates;

pub use error::ViewError;
pub use templates::{TemplateViews, ViewsConfig};

// Re-export tera types that users might need
pub use tera::Context;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{TemplateViews, ViewError, ViewsConfig};
}
