//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GROCER_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `GROCER_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `GROCER_HOST` - Bind address (default: 127.0.0.1)
//! - `GROCER_PORT` - Listen port (default: 5000)
//! - `GROCER_STATIC_DIR` - Directory served under `/static` (default: crates/storefront/static)
//! - `GROCER_SEARCH_LIMIT` - Maximum search results (default: 10)
//! - `GROCER_CATALOG_CACHE_TTL_SECS` - Product listing cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Maximum number of products returned by search
    pub search_limit: i64,
    /// How long product listings stay cached
    pub catalog_cache_ttl: Duration,
    /// Error tracking settings
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = env.database_url("GROCER_DATABASE_URL")?;
        let base_url = env.required("GROCER_BASE_URL")?;
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("GROCER_BASE_URL".to_string(), e.to_string()))?;

        let host = env.parsed_or("GROCER_HOST", "127.0.0.1".parse::<IpAddr>().ok())?;
        let port = env.parsed_or("GROCER_PORT", Some(5000_u16))?;
        let static_dir = env
            .optional("GROCER_STATIC_DIR")
            .map_or_else(|| PathBuf::from("crates/storefront/static"), PathBuf::from);
        let search_limit: i64 = env.parsed_or("GROCER_SEARCH_LIMIT", Some(10))?;
        if search_limit < 1 {
            return Err(ConfigError::InvalidEnvVar(
                "GROCER_SEARCH_LIMIT".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let cache_ttl_secs: u64 = env.parsed_or("GROCER_CATALOG_CACHE_TTL_SECS", Some(300))?;

        let sentry = SentryConfig {
            dsn: env.optional("SENTRY_DSN"),
            environment: env.optional("SENTRY_ENVIRONMENT"),
            sample_rate: env.parsed_or("SENTRY_SAMPLE_RATE", Some(1.0))?,
            traces_sample_rate: env.parsed_or("SENTRY_TRACES_SAMPLE_RATE", Some(0.0))?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            static_dir,
            search_limit,
            catalog_cache_ttl: Duration::from_secs(cache_ttl_secs),
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over TLS (controls `Secure` cookies).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: Option<T>) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => default.ok_or_else(|| ConfigError::MissingEnvVar(key.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("GROCER_DATABASE_URL", "postgres://localhost/grocer"),
        ("GROCER_BASE_URL", "http://localhost:5000"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.static_dir, PathBuf::from("crates/storefront/static"));
        assert!(config.sentry.dsn.is_none());
        assert!(!config.is_https());
    }

    #[test]
    fn test_socket_addr() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("GROCER_HOST", "0.0.0.0"));
        vars.push(("GROCER_PORT", "8080"));
        let addr = load(&vars).unwrap().socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[("GROCER_DATABASE_URL", "postgres://localhost/grocer")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "GROCER_BASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[
            ("DATABASE_URL", "postgres://fallback/grocer"),
            ("GROCER_BASE_URL", "https://grocer.example"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback/grocer");
        assert!(config.is_https());
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("GROCER_PORT", "not-a-port"));
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "GROCER_PORT"));
    }

    #[test]
    fn test_zero_search_limit_rejected() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("GROCER_SEARCH_LIMIT", "0"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[
            ("GROCER_DATABASE_URL", "postgres://grocer:hunter2@db/grocer"),
            ("GROCER_BASE_URL", "http://localhost:5000"),
        ])
        .unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
