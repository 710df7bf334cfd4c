//! Checkout, order history and payment history.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::Utc;
use tracing::instrument;

use greengrocer_core::OrderId;
use greengrocer_core::api::{
    CheckoutRequest, CheckoutResponse, OrderDetail, OrderSummary, PaymentRecord,
};

use super::{ApiJson, ApiPath};
use crate::db::orders::OrderRepository;
use crate::db::payments::PaymentRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::services::CheckoutService;
use crate::state::AppState;

/// Place an order from the cart.
///
/// POST /api/checkout
///
/// # Errors
///
/// 400 with the failing field's message (nothing is written), 400
/// `Cart is empty`, 409 when a line exceeds stock.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let placed = CheckoutService::new(state.pool())
        .place_order(user.id, &body, Utc::now().date_naive())
        .await?;

    // Stock changed, so cached listings are stale.
    state.catalog().invalidate_all().await;

    let order_id = placed.order_id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", &order_id)]));

    Ok((StatusCode::CREATED, Json(placed)))
}

/// The user's orders, newest first.
///
/// GET /api/orders
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderSummary>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}

/// One order with its items. Visible to its owner and to admins.
///
/// GET /api/orders/{id}
///
/// # Errors
///
/// 404 `Order not found`, also for orders of other users.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderDetail>> {
    let owned = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .filter(|owned| owned.owner == user.id || user.is_admin())
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    Ok(Json(owned.order))
}

/// The user's payments, newest first.
///
/// GET /api/payments
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn payments(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<PaymentRecord>>> {
    let payments = PaymentRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(payments))
}
