//! Admin product management and order status. The server enforces the role.

use serde_json::json;
use tracing::instrument;

use greengrocer_core::api::{MessageResponse, Product, ProductCreated, ProductInput};
use greengrocer_core::{OrderId, OrderStatus, ProductId};

use crate::GreengrocerClient;
use crate::error::Result;
use crate::request::RequestOptions;

/// Admin-only operations.
#[derive(Debug, Clone, Copy)]
pub struct Admin<'a> {
    client: &'a GreengrocerClient,
}

impl<'a> Admin<'a> {
    pub(crate) const fn new(client: &'a GreengrocerClient) -> Self {
        Self { client }
    }

    /// All products, including sold-out ones.
    ///
    /// # Errors
    ///
    /// 403 `Admin access required` for customers.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.client
            .request("admin/products", RequestOptions::get())
            .await
    }

    /// Add a product, returning its id.
    ///
    /// # Errors
    ///
    /// 400 for invalid input, 403 for customers.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn add_product(&self, input: &ProductInput) -> Result<ProductId> {
        let created: ProductCreated = self
            .client
            .request(
                "admin/products",
                RequestOptions::post(serde_json::to_value(input)?),
            )
            .await?;
        Ok(created.id)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// 400 for invalid input, 404 for an unknown product.
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: ProductId, input: &ProductInput) -> Result<()> {
        self.client
            .request::<MessageResponse>(
                &format!("admin/products/{id}"),
                RequestOptions::put(serde_json::to_value(input)?),
            )
            .await?;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// 404 for an unknown product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.client
            .request::<MessageResponse>(&format!("admin/products/{id}"), RequestOptions::delete())
            .await?;
        Ok(())
    }

    /// Move an order to another status.
    ///
    /// # Errors
    ///
    /// 404 for an unknown order.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        self.client
            .request::<MessageResponse>(
                &format!("admin/orders/{id}/status"),
                RequestOptions::post(json!({ "status": status })),
            )
            .await?;
        Ok(())
    }
}
