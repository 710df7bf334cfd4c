//! Cart line queries.

use sqlx::{PgConnection, PgPool};

use greengrocer_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::CartLine;

const CART_LINES: &str = r"
    SELECT c.product_id, p.name, p.price, c.quantity, p.image_url, p.stock
    FROM cart_items c
    JOIN products p ON p.id = c.product_id
    WHERE c.user_id = $1
    ORDER BY c.created_at, c.product_id
";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All lines in a user's cart, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(CART_LINES)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(lines)
    }

    /// Quantity of a product already in the cart (0 if absent).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn quantity_of(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<i32, RepositoryError> {
        let quantity: Option<i32> = sqlx::query_scalar(
            "SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(quantity.unwrap_or(0))
    }

    /// Add `quantity` units, accumulating onto an existing line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Remove a product from the cart. Removing an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        clear_in(&mut conn, user_id).await
    }

    /// Total units in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM cart_items WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }
}

/// Cart lines with their product rows locked until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lines_for_update(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Vec<CartLine>, RepositoryError> {
    let sql = format!("{CART_LINES} FOR UPDATE OF p");
    let lines = sqlx::query_as::<_, CartLine>(&sql)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(lines)
}

/// Empty a user's cart on an existing connection or transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn clear_in(conn: &mut PgConnection, user_id: UserId) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
