//! Checkout: turn a cart into an order and a payment record.
//!
//! Everything happens in one transaction. Product rows in the cart are
//! locked while stock is checked and decremented. There is no payment
//! gateway: prepaid methods are recorded as completed and confirm the order
//! straight away; cash on delivery leaves both pending.

use chrono::NaiveDate;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use greengrocer_core::api::{CheckoutRequest, CheckoutResponse};
use greengrocer_core::{CheckoutValidationError, OrderStatus, PaymentStatus, UserId};

use crate::db::payments::NewPayment;
use crate::db::{RepositoryError, cart, orders, payments};
use crate::models::Cart;

/// Errors that stop an order from being placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] CheckoutValidationError),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Only {available} of {name} left in stock")]
    InsufficientStock { name: String, available: i32 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Order and payment status recorded for a payment method.
#[must_use]
pub const fn outcome_for(prepaid: bool) -> (OrderStatus, PaymentStatus) {
    if prepaid {
        (OrderStatus::Confirmed, PaymentStatus::Completed)
    } else {
        (OrderStatus::Pending, PaymentStatus::Pending)
    }
}

/// Checkout service for one request.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Validate the request and place the order.
    ///
    /// Validation runs before any database access, so a rejected request
    /// creates nothing.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation`, `CheckoutError::EmptyCart` or
    /// `CheckoutError::InsufficientStock`; nothing is written in those cases.
    #[instrument(skip(self, request), fields(method = %request.payment.method()))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: &CheckoutRequest,
        today: NaiveDate,
    ) -> Result<CheckoutResponse, CheckoutError> {
        let address = request.validate(today)?;

        let mut tx = self.pool.begin().await?;

        let basket = Cart::new(cart::lines_for_update(&mut tx, user_id).await?);
        if basket.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if let Some(line) = basket.short_lines().next() {
            return Err(CheckoutError::InsufficientStock {
                name: line.name.clone(),
                available: line.stock,
            });
        }

        let total = basket.total().rounded();
        let method = request.payment.method();
        let (order_status, payment_status) = outcome_for(method.is_prepaid());

        let order_id = orders::create_from_lines(
            &mut tx,
            user_id,
            address.as_str(),
            total,
            order_status,
            &basket.lines,
        )
        .await?;

        let reference = request.payment.reference();
        payments::insert(
            &mut tx,
            &NewPayment {
                order_id,
                amount: total,
                method,
                status: payment_status,
                reference: reference.as_deref(),
            },
        )
        .await?;

        cart::clear_in(&mut tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(order_id = %order_id, total = %total, "Order placed");

        Ok(CheckoutResponse {
            order_id,
            total,
            status: order_status,
            payment_status,
        })
    }
}
