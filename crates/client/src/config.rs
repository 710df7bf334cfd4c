//! Client configuration.
//!
//! # Environment Variables
//!
//! - `GROCER_BASE_URL` - Storefront URL (default: http://127.0.0.1:5000)
//! - `GROCER_USER_FILE` - Keep the signed-in user in this JSON file instead of memory

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::error::{ClientError, Result};
use crate::store::{FileUserStore, MemoryUserStore, UserStore};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Where the client sends requests and keeps the signed-in user.
#[derive(Clone)]
pub struct ClientConfig {
    /// Storefront URL; the API lives under `/api` below it.
    pub base_url: Url,
    pub user_store: Arc<dyn UserStore>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("user_store", &self.user_store)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration with an in-memory user store.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `base_url` does not parse, or
    /// [`ClientError::Config`] if it is not http(s).
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "base URL must be http or https, got {}",
                base_url.scheme()
            )));
        }
        Ok(Self {
            base_url,
            user_store: Arc::new(MemoryUserStore::new()),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if `GROCER_BASE_URL` is set but invalid.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if `GROCER_BASE_URL` is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = non_blank("GROCER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let config = Self::new(base_url.trim())?;

        Ok(match non_blank("GROCER_USER_FILE") {
            Some(path) => config.with_user_store(FileUserStore::new(path)),
            None => config,
        })
    }

    /// Replace the user store.
    #[must_use]
    pub fn with_user_store(mut self, store: impl UserStore + 'static) -> Self {
        self.user_store = Arc::new(store);
        self
    }

    /// The API root: `/api/` below the base URL, keeping any base path.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL cannot be joined.
    pub fn api_root(&self) -> Result<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join("api/")?)
    }
}
