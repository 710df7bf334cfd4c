//! Checkout, order history and payment history.

use chrono::Utc;
use tracing::instrument;

use greengrocer_core::OrderId;
use greengrocer_core::api::{
    CheckoutRequest, CheckoutResponse, OrderDetail, OrderSummary, PaymentRecord,
};

use crate::GreengrocerClient;
use crate::error::Result;
use crate::request::RequestOptions;

/// Orders and payments of the signed-in user.
#[derive(Debug, Clone, Copy)]
pub struct Orders<'a> {
    client: &'a GreengrocerClient,
}

impl<'a> Orders<'a> {
    pub(crate) const fn new(client: &'a GreengrocerClient) -> Self {
        Self { client }
    }

    /// Place an order from the cart.
    ///
    /// The address and the active payment group are validated first; invalid
    /// input never reaches the server.
    ///
    /// # Errors
    ///
    /// [`crate::ClientError::Validation`] for bad input,
    /// [`crate::ClientError::NotLoggedIn`] without a stored user, otherwise
    /// the server's message (`Cart is empty`, stock conflicts).
    #[instrument(skip(self, request), fields(method = %request.payment.method()))]
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse> {
        request.validate(Utc::now().date_naive())?;
        self.client.require_user()?;

        let placed: CheckoutResponse = self
            .client
            .request(
                "checkout",
                RequestOptions::post(serde_json::to_value(request)?),
            )
            .await?;
        tracing::info!(order_id = %placed.order_id, "Order placed");
        Ok(placed)
    }

    /// Orders, newest first.
    ///
    /// # Errors
    ///
    /// Any request failure.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<OrderSummary>> {
        self.client.request("orders", RequestOptions::get()).await
    }

    /// One order with its items.
    ///
    /// # Errors
    ///
    /// 404 `Order not found`, also for other users' orders.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<OrderDetail> {
        self.client
            .request(&format!("orders/{id}"), RequestOptions::get())
            .await
    }

    /// Payments, newest first.
    ///
    /// # Errors
    ///
    /// Any request failure.
    #[instrument(skip(self))]
    pub async fn payments(&self) -> Result<Vec<PaymentRecord>> {
        self.client.request("payments", RequestOptions::get()).await
    }
}
