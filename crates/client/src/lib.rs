//! Greengrocer Client - typed access to the storefront JSON API.
//!
//! # Example
//!
//! ```rust,ignore
//! use greengrocer_client::{ClientConfig, GreengrocerClient};
//!
//! let client = GreengrocerClient::new(ClientConfig::from_env()?)?;
//!
//! client.auth().login("asha@example.com", "correct horse").await?;
//! let featured = client.products().featured().await?;
//! client.cart().add(featured[0].id, 2).await?;
//! let cart = client.cart().get().await?;
//! ```
//!
//! The client keeps the server's session cookie in memory and the signed-in
//! user in a [`UserStore`]. Calls that need a user check the store first and
//! fail with [`ClientError::NotLoggedIn`] without touching the network.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod orders;
pub mod products;
pub mod request;
pub mod store;

use std::sync::Arc;

use url::Url;

use greengrocer_core::api::UserRecord;

pub use admin::Admin;
pub use auth::Auth;
pub use cart::Cart;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use orders::Orders;
pub use products::Products;
pub use request::RequestOptions;
pub use store::{FileUserStore, MemoryUserStore, StoreError, UserStore};

/// Client for the storefront API.
///
/// Cheap to clone; clones share the cookie jar and the user store.
#[derive(Clone, Debug)]
pub struct GreengrocerClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    api_root: Url,
    store: Arc<dyn UserStore>,
}

impl GreengrocerClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot be extended with `/api/`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!("greengrocer-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let api_root = config.api_root()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                api_root,
                store: config.user_store,
            }),
        })
    }

    #[must_use]
    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    #[must_use]
    pub fn products(&self) -> Products<'_> {
        Products::new(self)
    }

    #[must_use]
    pub fn cart(&self) -> Cart<'_> {
        Cart::new(self)
    }

    #[must_use]
    pub fn orders(&self) -> Orders<'_> {
        Orders::new(self)
    }

    #[must_use]
    pub fn admin(&self) -> Admin<'_> {
        Admin::new(self)
    }

    /// Whether a user record is stored. An unreadable store counts as
    /// logged out.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        matches!(self.inner.store.load(), Ok(Some(_)))
    }

    /// The stored user record.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] if the store cannot be read.
    pub fn current_user(&self) -> Result<Option<UserRecord>> {
        Ok(self.inner.store.load()?)
    }

    /// The stored user, or [`ClientError::NotLoggedIn`].
    pub(crate) fn require_user(&self) -> Result<UserRecord> {
        self.current_user()?.ok_or(ClientError::NotLoggedIn)
    }

    pub(crate) fn store(&self) -> &dyn UserStore {
        self.inner.store.as_ref()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// `endpoint` resolved under the API root.
    pub(crate) fn api_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self
            .inner
            .api_root
            .join(endpoint.trim_start_matches('/'))?)
    }
}
