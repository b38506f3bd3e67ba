use http::Method;
use std::time::Duration;

/// Configuration for CSRF protection.
#[derive(Clone, Debug)]
pub struct CsrfConfig {
    /// Body field holding the token.
    /// Default: "csrf_token"
    pub field_name: String,

    /// Header consulted when the body carries no token.
    /// Default: "X-CSRF-TOKEN"
    pub header_name: String,

    /// Methods whose requests must carry a valid token.
    /// Default: POST
    pub protected_methods: Vec<Method>,

    /// The length of the generated random token (in bytes).
    /// Default: 32 (resulting in 43 chars base64)
    pub token_length: usize,

    /// How long an issued token stays valid.
    /// Default: 2 hours
    pub token_ttl: Duration,

    /// Most tokens a `TokenStore` keeps at once.
    /// Default: 4096
    pub max_tokens: usize,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            field_name: "csrf_token".to_string(),
            header_name: "X-CSRF-TOKEN".to_string(),
            protected_methods: vec![Method::POST],
            token_length: 32,
            token_ttl: Duration::from_secs(60 * 60 * 2),
            max_tokens: 4096,
        }
    }
}

impl CsrfConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body field name.
    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Set the header name.
    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Also require a token for `method`.
    pub fn protect(mut self, method: Method) -> Self {
        if !self.protected_methods.contains(&method) {
            self.protected_methods.push(method);
        }
        self
    }

    /// Set the generated token length in bytes.
    pub fn token_length(mut self, length: usize) -> Self {
        self.token_length = length;
        self
    }

    /// Set the lifetime of issued tokens.
    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set the most tokens a store keeps at once.
    pub fn max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = max;
        self
    }

    pub(crate) fn is_protected(&self, method: &Method) -> bool {
        self.protected_methods.contains(method)
    }
}
