use super::CsrfConfig;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::DashMap;
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A CSRF token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Generate a new random CSRF token of the specified length.
    pub fn generate(length: usize) -> Self {
        let mut bytes = vec![0u8; length];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(&bytes))
    }

    /// Create a token from an existing string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CsrfToken").field(&"***").finish()
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decides whether a submitted token is acceptable.
///
/// Any `Fn(&str) -> bool` closure is a validator.
pub trait TokenValidator: Send + Sync + 'static {
    /// Return `true` if `token` is valid.
    fn validate(&self, token: &str) -> bool;
}

impl<F> TokenValidator for F
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    fn validate(&self, token: &str) -> bool {
        self(token)
    }
}

/// Expired tokens are purged after this many issues.
const PURGE_EVERY: usize = 256;

/// Issued tokens with their expiry.
///
/// Cloning is cheap; clones share the same tokens, so one store can issue
/// tokens from handlers and validate them in [`CsrfMiddleware`](super::CsrfMiddleware).
///
/// The store holds at most `max_tokens` entries. Issuing into a full store
/// first drops expired tokens, then the tokens closest to expiry.
#[derive(Clone)]
pub struct TokenStore {
    tokens: Arc<DashMap<String, Instant>>,
    issued: Arc<AtomicUsize>,
    length: usize,
    ttl: Duration,
    capacity: usize,
}

impl TokenStore {
    /// Create a store using the token length and lifetime of `config`.
    pub fn new(config: &CsrfConfig) -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
            issued: Arc::new(AtomicUsize::new(0)),
            length: config.token_length,
            ttl: config.token_ttl,
            capacity: config.max_tokens.max(1),
        }
    }

    /// Generate and remember a fresh token.
    pub fn issue(&self) -> CsrfToken {
        let issued = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        if issued % PURGE_EVERY == 0 || self.tokens.len() >= self.capacity {
            self.purge_expired();
        }
        while self.tokens.len() >= self.capacity && self.evict_oldest() {}

        let token = CsrfToken::generate(self.length);
        self.tokens.insert(token.as_str().to_string(), Instant::now() + self.ttl);
        token
    }

    fn evict_oldest(&self) -> bool {
        let oldest = self
            .tokens
            .iter()
            .min_by_key(|entry| *entry.value())
            .map(|entry| entry.key().clone());
        match oldest {
            Some(token) => {
                tracing::debug!("Evicted CSRF token from full store");
                self.tokens.remove(&token).is_some()
            }
            None => false,
        }
    }

    /// Most tokens the store keeps at once.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget `token`. Returns `true` if it was known.
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }

    /// Drop every expired token.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.tokens.retain(|_, expires| *expires > now);
    }

    /// Number of tokens currently remembered, expired ones included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no tokens are remembered.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(&CsrfConfig::default())
    }
}

impl TokenValidator for TokenStore {
    fn validate(&self, token: &str) -> bool {
        let expired = match self.tokens.get(token) {
            Some(expires) => *expires <= Instant::now(),
            None => return false,
        };
        if expired {
            self.tokens.remove(token);
            tracing::debug!("Rejected expired CSRF token");
        }
        !expired
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("tokens", &self.tokens.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}
