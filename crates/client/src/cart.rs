//! Cart operations. Each checks for a stored user before sending anything.

use serde_json::json;
use tracing::instrument;

use greengrocer_core::ProductId;
use greengrocer_core::api::{CartResponse, MessageResponse};

use crate::GreengrocerClient;
use crate::error::Result;
use crate::request::RequestOptions;

/// The signed-in user's cart.
#[derive(Debug, Clone, Copy)]
pub struct Cart<'a> {
    client: &'a GreengrocerClient,
}

impl<'a> Cart<'a> {
    pub(crate) const fn new(client: &'a GreengrocerClient) -> Self {
        Self { client }
    }

    /// Add `quantity` units; quantities of the same product accumulate.
    ///
    /// # Errors
    ///
    /// [`crate::ClientError::NotLoggedIn`] without a request when no user is
    /// stored; otherwise the server's message (e.g. `Only 3 left in stock`).
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: ProductId, quantity: i32) -> Result<String> {
        self.client.require_user()?;
        let response: MessageResponse = self
            .client
            .request(
                "cart/add",
                RequestOptions::post(json!({ "product_id": product_id, "quantity": quantity })),
            )
            .await?;
        Ok(response.message)
    }

    /// Remove a product. Removing an absent product succeeds.
    ///
    /// # Errors
    ///
    /// [`crate::ClientError::NotLoggedIn`], or any request failure.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) -> Result<String> {
        self.client.require_user()?;
        let response: MessageResponse = self
            .client
            .request(
                "cart/remove",
                RequestOptions::post(json!({ "product_id": product_id })),
            )
            .await?;
        Ok(response.message)
    }

    /// Lines with totals.
    ///
    /// # Errors
    ///
    /// [`crate::ClientError::NotLoggedIn`], or any request failure.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<CartResponse> {
        self.client.require_user()?;
        self.client.request("cart", RequestOptions::get()).await
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// [`crate::ClientError::NotLoggedIn`], or any request failure.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        self.client.require_user()?;
        self.client
            .request::<MessageResponse>("cart/clear", RequestOptions::post(json!({})))
            .await?;
        Ok(())
    }
}
