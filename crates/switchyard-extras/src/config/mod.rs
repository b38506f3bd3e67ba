//! Configuration management with environment variable support.
//!
//! Values come from the process environment after an optional `.env` file
//! has been loaded. [`SwitchyardConfig`] covers the router's own settings;
//! [`Config<T>`] deserializes any application struct the same way.
//!
//! # Example
//!
//! ```ignore
//! use switchyard_extras::config::{load_dotenv, SwitchyardConfig};
//!
//! load_dotenv();
//! let config = SwitchyardConfig::from_env()?;
//! let addr = config.socket_addr()?;
//! ```

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use switchyard_core::Environment;

/// Prefix of the variables read by [`SwitchyardConfig::from_env`].
pub const ENV_PREFIX: &str = "SWITCHYARD_";

/// Error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable deserialization failed.
    #[error("Configuration error: {0}")]
    Envy(#[from] envy::Error),

    /// A variable is set but its value is unusable.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Offending value
        value: String,
    },
}

/// Router settings read from `SWITCHYARD_*` variables.
///
/// | Variable | Field | Default |
/// |---|---|---|
/// | `SWITCHYARD_VIEWS_ROOT` | `views_root` | `views` |
/// | `SWITCHYARD_BIND_ADDR` | `bind_addr` | `127.0.0.1:8080` |
/// | `SWITCHYARD_CSRF_HEADER` | `csrf_header` | `X-CSRF-TOKEN` |
/// | `SWITCHYARD_ENV` | `env` | `development` |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SwitchyardConfig {
    /// Directory holding file-backed views
    pub views_root: PathBuf,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Header consulted for CSRF tokens when the body has none
    pub csrf_header: String,
    /// Environment profile name
    pub env: String,
}

impl Default for SwitchyardConfig {
    fn default() -> Self {
        Self {
            views_root: PathBuf::from("views"),
            bind_addr: "127.0.0.1:8080".to_string(),
            csrf_header: "X-CSRF-TOKEN".to_string(),
            env: "development".to_string(),
        }
    }
}

impl SwitchyardConfig {
    /// Load from `SWITCHYARD_*` variables; unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Envy`] when a variable cannot be deserialized.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = envy::prefixed(ENV_PREFIX).from_env::<Self>()?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Parse [`bind_addr`](Self::bind_addr).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if it is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr.parse().map_err(|_| ConfigError::InvalidValue {
            key: format!("{}BIND_ADDR", ENV_PREFIX),
            value: self.bind_addr.clone(),
        })
    }

    /// The environment profile named by [`env`](Self::env).
    pub fn environment(&self) -> Environment {
        match self.env.as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// CSRF settings using the configured header.
    #[cfg(feature = "csrf")]
    pub fn csrf(&self) -> crate::csrf::CsrfConfig {
        crate::csrf::CsrfConfig::new().header_name(self.csrf_header.clone())
    }
}

/// Typed configuration extracted from environment variables.
///
/// # Example
///
/// ```ignore
/// use switchyard_extras::config::Config;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct DatabaseConfig {
///     database_url: String,
/// }
///
/// let config = Config::<DatabaseConfig>::from_env()?;
/// println!("URL: {}", config.database_url);
/// ```
#[derive(Debug, Clone)]
pub struct Config<T>(pub T);

impl<T: DeserializeOwned> Config<T> {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing
    /// or if deserialization fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        envy::from_env::<T>().map(Config).map_err(ConfigError::from)
    }

    /// Load configuration from variables starting with `{prefix}_`.
    pub fn from_env_prefixed(prefix: &str) -> Result<Self, ConfigError> {
        envy::prefixed(format!("{}_", prefix))
            .from_env::<T>()
            .map(Config)
            .map_err(ConfigError::from)
    }

    /// Get the inner configuration value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Load environment variables from a `.env` file in the current directory.
///
/// Existing variables take precedence; a missing file is not an error.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
}

/// Load environment variables from a specific file path.
pub fn load_dotenv_from<P: AsRef<std::path::Path>>(path: P) {
    let _ = dotenvy::from_path(path);
}

/// Get an environment variable with a default value.
pub fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable and parse it to a specific type.
pub fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
