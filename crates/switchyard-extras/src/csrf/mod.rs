//! CSRF protection
//!
//! [`CsrfMiddleware`] checks the token submitted with protected requests
//! (POST by default) against a [`TokenValidator`]. Any `Fn(&str) -> bool`
//! works as a validator; [`TokenStore`] is an in-memory one that also issues
//! tokens.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//! use switchyard_extras::csrf::{CsrfConfig, CsrfMiddleware, TokenStore};
//!
//! let store = TokenStore::default();
//! let mut router = Router::new();
//! router.add_middleware(CsrfMiddleware::with_store(store, CsrfConfig::default()));
//! ```

mod config;
mod layer;
mod token;

pub use config::CsrfConfig;
pub use layer::{CsrfMiddleware, CSRF_TOKEN_ATTRIBUTE};
pub use token::{CsrfToken, TokenStore, TokenValidator};
