//! # switchyard-extras
//!
//! Optional middleware and utilities for the Switchyard router, opt-in via
//! Cargo feature flags.
//!
//! ## Features
//!
//! - `csrf` - token validation middleware and an in-memory token store
//! - `logging` - request/response logging middleware
//! - `config` - `SWITCHYARD_*` configuration with `.env` file support
//!
//! All three are enabled by default.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// CSRF protection
#[cfg(feature = "csrf")]
pub mod csrf;

// Request/Response logging middleware
#[cfg(feature = "logging")]
pub mod logging;

// Configuration management module
#[cfg(feature = "config")]
pub mod config;

#[cfg(feature = "csrf")]
pub use csrf::{CsrfConfig, CsrfMiddleware, CsrfToken, TokenStore, TokenValidator};

#[cfg(feature = "logging")]
pub use logging::{LogFormat, LoggingConfig, LoggingMiddleware};

#[cfg(feature = "config")]
pub use config::{env_or, env_parse, load_dotenv, load_dotenv_from, Config, ConfigError, SwitchyardConfig};
