//! Order queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use greengrocer_core::api::{OrderDetail, OrderItem, OrderSummary};
use greengrocer_core::{OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::CartLine;

#[derive(sqlx::FromRow)]
struct OrderSummaryRow {
    id: OrderId,
    total_amount: Decimal,
    status: OrderStatus,
    delivery_address: String,
    item_count: i64,
    created_at: DateTime<Utc>,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        Self {
            id: row.id,
            total_amount: row.total_amount,
            status: row.status,
            delivery_address: row.delivery_address,
            item_count: row.item_count,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    total_amount: Decimal,
    status: OrderStatus,
    delivery_address: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    product_id: ProductId,
    product_name: String,
    quantity: i32,
    price: Decimal,
}

/// An order together with the user who placed it.
#[derive(Debug, Clone)]
pub struct OwnedOrder {
    pub owner: UserId,
    pub order: OrderDetail,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(
            r"
            SELECT o.id, o.total_amount, o.status, o.delivery_address, o.created_at,
                   COALESCE(SUM(i.quantity), 0)::BIGINT AS item_count
            FROM orders o
            LEFT JOIN order_items i ON i.order_id = o.id
            WHERE o.user_id = $1
            GROUP BY o.id
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderSummary::from).collect())
    }

    /// An order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OwnedOrder>, RepositoryError> {
        let Some(order) = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total_amount, status, delivery_address, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT product_id, product_name, quantity, price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OwnedOrder {
            owner: order.user_id,
            order: OrderDetail {
                id: order.id,
                total_amount: order.total_amount,
                status: order.status,
                delivery_address: order.delivery_address,
                created_at: order.created_at,
                items: items
                    .into_iter()
                    .map(|item| OrderItem {
                        product_id: item.product_id,
                        name: item.product_name,
                        quantity: item.quantity,
                        price: item.price,
                    })
                    .collect(),
            },
        }))
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Insert an order and one item per cart line, snapshotting current prices,
/// and take the ordered units out of stock.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any statement fails.
pub async fn create_from_lines(
    conn: &mut PgConnection,
    user_id: UserId,
    delivery_address: &str,
    total: Decimal,
    status: OrderStatus,
    lines: &[CartLine],
) -> Result<OrderId, RepositoryError> {
    let order_id: OrderId = sqlx::query_scalar(
        r"
        INSERT INTO orders (user_id, total_amount, delivery_address, status)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        ",
    )
    .bind(user_id)
    .bind(total)
    .bind(delivery_address)
    .bind(status)
    .fetch_one(&mut *conn)
    .await?;

    for line in lines {
        sqlx::query(
            r"
            INSERT INTO order_items (order_id, product_id, product_name, quantity, price)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.name)
        .bind(line.quantity)
        .bind(line.price)
        .execute(&mut *conn)
        .await?;

        sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1")
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *conn)
            .await?;
    }

    Ok(order_id)
}
