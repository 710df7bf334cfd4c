//! Login, registration and logout.

use serde_json::json;
use tracing::instrument;

use greengrocer_core::api::{LoginResponse, MessageResponse, UserRecord};

use crate::GreengrocerClient;
use crate::error::Result;
use crate::request::RequestOptions;

/// Account operations.
#[derive(Debug, Clone, Copy)]
pub struct Auth<'a> {
    client: &'a GreengrocerClient,
}

impl<'a> Auth<'a> {
    pub(crate) const fn new(client: &'a GreengrocerClient) -> Self {
        Self { client }
    }

    /// Log in and store the returned user record.
    ///
    /// # Errors
    ///
    /// `Invalid credentials` (401) from the server, or a store failure.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord> {
        let response: LoginResponse = self
            .client
            .request(
                "login",
                RequestOptions::post(json!({ "email": email, "password": password })),
            )
            .await?;
        self.client.store().save(&response.user)?;
        tracing::info!(user_id = %response.user.id, "Logged in");
        Ok(response.user)
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// The server's validation or duplicate message (400/409).
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<String> {
        let response: MessageResponse = self
            .client
            .request(
                "register",
                RequestOptions::post(json!({
                    "username": username,
                    "email": email,
                    "password": password,
                })),
            )
            .await?;
        Ok(response.message)
    }

    /// End the session. The stored record is removed even when the server
    /// call fails.
    ///
    /// # Errors
    ///
    /// The server call's error, or a store failure.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let result = self
            .client
            .request::<MessageResponse>("logout", RequestOptions::post(json!({})))
            .await;
        self.client.store().clear()?;
        result.map(|_| ())
    }

    /// The user the server has in the session.
    ///
    /// # Errors
    ///
    /// 401 `Please login first` when the session is gone.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserRecord> {
        self.client.request("me", RequestOptions::get()).await
    }
}
