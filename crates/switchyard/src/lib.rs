//! # Switchyard
//!
//! HTTP request routing and dispatch.
//!
//! A [`Router`] takes a request through, in order, registered routes, API
//! controllers (`/api/{controller}/{action}/...`), web controllers
//! (`/{controller}/{action}/...`) and file-backed views, and answers 404 when
//! nothing matches. Global middleware wraps the whole resolution; route and
//! group middleware wrap the matched handler.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     init_tracing();
//!
//!     let mut router = Router::new();
//!     router.add_middleware(RequestIdMiddleware::new());
//!     router.get("blog/{year}/{month}/{slug}", |req: Request| {
//!         format!("{}/{}: {}", req.param("year").unwrap_or(""), req.param("month").unwrap_or(""), req.param("slug").unwrap_or(""))
//!     })?;
//!     router.group("admin", vec![], |admin| {
//!         admin.get("dashboard", |_req: Request| Html("<h1>Admin</h1>"))?;
//!         Ok(())
//!     })?;
//!
//!     tokio::runtime::Runtime::new()?.block_on(serve(router, "127.0.0.1:8080"))
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `view` - file-backed views rendered with Tera
//! - `csrf` - CSRF validation middleware
//! - `logging` - request/response logging middleware
//! - `config` - `SWITCHYARD_*` configuration with `.env` support
//! - `test-utils` - in-process `TestClient`
//!
//! `view`, `csrf`, `logging` and `config` are on by default.

// Re-export core functionality
pub use switchyard_core::*;

// Re-export views (feature-gated)
#[cfg(feature = "view")]
pub use switchyard_view as views;
#[cfg(feature = "view")]
pub use switchyard_view::{TemplateViews, ViewError, ViewsConfig};

// Re-export extras (feature-gated)
#[cfg(feature = "csrf")]
pub use switchyard_extras::csrf;
#[cfg(feature = "csrf")]
pub use switchyard_extras::{CsrfConfig, CsrfMiddleware, CsrfToken, TokenStore, TokenValidator};

#[cfg(feature = "logging")]
pub use switchyard_extras::logging;
#[cfg(feature = "logging")]
pub use switchyard_extras::{LogFormat, LoggingConfig, LoggingMiddleware};

#[cfg(feature = "config")]
pub use switchyard_extras::config;
#[cfg(feature = "config")]
pub use switchyard_extras::{env_or, env_parse, load_dotenv, load_dotenv_from, Config, ConfigError, SwitchyardConfig};

/// Prelude module - import everything you need with `use switchyard::prelude::*`
pub mod prelude {
    pub use switchyard_core::{
        from_fn,
        init_tracing,
        serve,
        // Controllers
        ActionContext,
        // Error handling
        ApiError,
        Controller,
        ControllerRegistration,
        ControllerRegistry,
        Html,
        IntoReply,
        // Response types
        IntoResponse,
        Json,
        // Middleware
        Middleware,
        MiddlewareQueue,
        NoContent,
        Output,
        Redirect,
        Reply,
        // Request context
        Request,
        RequestIdMiddleware,
        Response,
        Result,
        RouteError,
        RouteGroup,
        // Router
        Router,
        Server,
        SharedMiddleware,
        TracingMiddleware,
    };

    #[cfg(feature = "view")]
    pub use switchyard_view::{TemplateViews, ViewsConfig};

    #[cfg(feature = "csrf")]
    pub use switchyard_extras::{CsrfConfig, CsrfMiddleware, TokenStore};

    #[cfg(feature = "logging")]
    pub use switchyard_extras::{LogFormat, LoggingMiddleware};

    #[cfg(feature = "config")]
    pub use switchyard_extras::{load_dotenv, SwitchyardConfig};

    // Re-export commonly used external types
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::json;
    pub use tracing::{debug, error, info, trace, warn};
}
