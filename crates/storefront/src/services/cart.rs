//! Cart operations with stock checks.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use greengrocer_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::models::Cart;

/// Errors from cart writes.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
    #[error("Product not found")]
    ProductNotFound,
    #[error("Only {available} left in stock")]
    InsufficientStock { available: i32 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Cart service for one request.
pub struct CartService<'a> {
    pool: &'a PgPool,
    cart: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            cart: CartRepository::new(pool),
        }
    }

    /// The user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        Ok(Cart::new(self.cart.lines(user_id).await?))
    }

    /// Add units of a product. The resulting line may not exceed stock.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity`, `CartError::ProductNotFound` or
    /// `CartError::InsufficientStock`.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let product = ProductRepository::new(self.pool)
            .get(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        let existing = self.cart.quantity_of(user_id, product_id).await?;
        if existing.saturating_add(quantity) > product.stock {
            return Err(CartError::InsufficientStock {
                available: (product.stock - existing).max(0),
            });
        }

        self.cart.add(user_id, product_id, quantity).await?;
        Ok(())
    }

    /// Remove a product. Absent products are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        self.cart.remove(user_id, product_id).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        self.cart.clear(user_id).await
    }

    /// Units in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        self.cart.count(user_id).await
    }
}
