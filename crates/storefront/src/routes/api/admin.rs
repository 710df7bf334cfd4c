//! Admin product management and order status. All require the admin role.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tracing::instrument;

use greengrocer_core::api::{
    MessageResponse, Product, ProductCreated, ProductInput, ProductQuery, UpdateOrderStatusRequest,
};
use greengrocer_core::{OrderId, ProductId};

use super::{ApiJson, ApiPath};
use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// All products, including sold-out ones.
///
/// GET /api/admin/products
#[instrument(skip(state, _admin))]
pub async fn list_products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    let products = state
        .catalog()
        .list(state.pool(), &ProductQuery::default())
        .await?;
    Ok(Json(products.as_ref().clone()))
}

/// Add a product.
///
/// POST /api/admin/products
///
/// # Errors
///
/// 400 for a blank name or a negative price or stock.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<ProductCreated>)> {
    let id = state.catalog().create(state.pool(), body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductCreated {
            id,
            message: "Product added successfully".to_string(),
        }),
    ))
}

/// Replace a product's fields.
///
/// PUT /api/admin/products/{id}
///
/// # Errors
///
/// 400 for invalid input, 404 for an unknown product.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<ProductInput>,
) -> Result<Json<MessageResponse>> {
    state.catalog().update(state.pool(), id, body).await?;
    Ok(Json(MessageResponse::new("Product updated successfully")))
}

/// Delete a product.
///
/// DELETE /api/admin/products/{id}
///
/// # Errors
///
/// 404 for an unknown product.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<MessageResponse>> {
    state
        .catalog()
        .delete(state.pool(), id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
            other => other.into(),
        })?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

/// Move an order to another status.
///
/// POST /api/admin/orders/{id}/status
///
/// # Errors
///
/// 404 for an unknown order.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(body): ApiJson<UpdateOrderStatusRequest>,
) -> Result<Json<MessageResponse>> {
    OrderRepository::new(state.pool())
        .update_status(id, body.status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order not found".to_string()),
            other => other.into(),
        })?;
    tracing::info!(order_id = %id, status = %body.status, "Order status updated");
    Ok(Json(MessageResponse::new("Order status updated")))
}
