use super::config::CsrfConfig;
use super::token::{TokenStore, TokenValidator};
use std::sync::Arc;
use switchyard_core::{ApiError, IntoResponse, Middleware, MiddlewareQueue, Request, Response, Result};

/// Request attribute carrying the token issued for a safe request.
pub const CSRF_TOKEN_ATTRIBUTE: &str = "csrf_token";

/// Middleware rejecting protected requests whose token fails validation.
///
/// The token is read from the parsed body field (`csrf_token` by default)
/// and, failing that, from the configured header. A missing or invalid token
/// answers 403 without running the rest of the chain.
pub struct CsrfMiddleware<V> {
    validator: V,
    issuer: Option<TokenStore>,
    config: Arc<CsrfConfig>,
}

impl<V: TokenValidator> CsrfMiddleware<V> {
    /// Create the middleware with the default configuration.
    pub fn new(validator: V) -> Self {
        Self::with_config(validator, CsrfConfig::default())
    }

    /// Create the middleware with a custom configuration.
    pub fn with_config(validator: V, config: CsrfConfig) -> Self {
        Self {
            validator,
            issuer: None,
            config: Arc::new(config),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    fn submitted<'r>(&self, req: &'r Request) -> Option<&'r str> {
        req.body_field(&self.config.field_name)
            .or_else(|| req.header(&self.config.header_name))
            .filter(|token| !token.is_empty())
    }
}

impl CsrfMiddleware<TokenStore> {
    /// Validate against `store` and expose a token on every unprotected
    /// request as the [`CSRF_TOKEN_ATTRIBUTE`] attribute, so handlers and
    /// views can embed it in forms. A still-valid submitted token is reused;
    /// otherwise a fresh one is issued.
    pub fn with_store(store: TokenStore, config: CsrfConfig) -> Self {
        Self {
            validator: store.clone(),
            issuer: Some(store),
            config: Arc::new(config),
        }
    }
}

impl<V: TokenValidator> Middleware for CsrfMiddleware<V> {
    fn process(&self, req: Request, next: &mut MiddlewareQueue<'_>) -> Result<Response> {
        if !self.config.is_protected(req.method()) {
            let req = match &self.issuer {
                Some(store) => {
                    let token = match self.submitted(&req) {
                        Some(token) if store.validate(token) => token.to_string(),
                        _ => store.issue().as_str().to_string(),
                    };
                    req.with_attribute(CSRF_TOKEN_ATTRIBUTE, token)
                }
                None => req,
            };
            return next.handle(req);
        }

        let valid = self
            .submitted(&req)
            .map(|token| self.validator.validate(token))
            .unwrap_or(false);

        if !valid {
            tracing::warn!(method = %req.method(), path = %req.path(), "CSRF token validation failed");
            return Ok(ApiError::new(
                http::StatusCode::FORBIDDEN,
                "csrf_forbidden",
                "CSRF token validation failed",
            )
            .into_response());
        }

        next.handle(req)
    }
}

impl<V> std::fmt::Debug for CsrfMiddleware<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfMiddleware")
            .field("config", &self.config)
            .field("issues_tokens", &self.issuer.is_some())
            .finish()
    }
}
