//! Payment record queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use greengrocer_core::api::PaymentRecord;
use greengrocer_core::{OrderId, PaymentId, PaymentMethod, PaymentStatus, UserId};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: PaymentId,
    order_id: OrderId,
    amount: Decimal,
    method: PaymentMethod,
    status: PaymentStatus,
    reference: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for PaymentRecord {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            amount: row.amount,
            method: row.method,
            status: row.status,
            reference: row.reference,
            created_at: row.created_at,
        }
    }
}

/// A payment about to be recorded.
#[derive(Debug, Clone)]
pub struct NewPayment<'a> {
    pub order_id: OrderId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference: Option<&'a str>,
}

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Payments for a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<PaymentRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r"
            SELECT p.id, p.order_id, p.amount, p.method, p.status, p.reference, p.created_at
            FROM payments p
            JOIN orders o ON o.id = p.order_id
            WHERE o.user_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PaymentRecord::from).collect())
    }
}

/// Record a payment on an existing connection or transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert(
    conn: &mut PgConnection,
    payment: &NewPayment<'_>,
) -> Result<PaymentId, RepositoryError> {
    let id: PaymentId = sqlx::query_scalar(
        r"
        INSERT INTO payments (order_id, amount, method, status, reference)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        ",
    )
    .bind(payment.order_id)
    .bind(payment.amount)
    .bind(payment.method)
    .bind(payment.status)
    .bind(payment.reference)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}
