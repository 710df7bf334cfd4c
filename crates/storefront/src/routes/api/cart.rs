//! Cart endpoints. All require a session.

use axum::{Json, extract::State};
use tracing::instrument;

use greengrocer_core::api::{AddToCartRequest, CartResponse, MessageResponse, RemoveFromCartRequest};

use super::ApiJson;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::CartService;
use crate::state::AppState;

/// The cart with line totals and grand total.
///
/// GET /api/cart
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    let cart = CartService::new(state.pool()).get(user.id).await?;
    Ok(Json(cart.to_response()))
}

/// Add units of a product; quantities accumulate.
///
/// POST /api/cart/add
///
/// # Errors
///
/// 400 for a quantity below 1 or more than is in stock, 404 for an unknown
/// product.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddToCartRequest>,
) -> Result<Json<MessageResponse>> {
    CartService::new(state.pool())
        .add(user.id, body.product_id, body.quantity)
        .await?;
    Ok(Json(MessageResponse::new("Product added to cart!")))
}

/// Remove a product. Removing an absent product still succeeds.
///
/// POST /api/cart/remove
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<RemoveFromCartRequest>,
) -> Result<Json<MessageResponse>> {
    CartService::new(state.pool())
        .remove(user.id, body.product_id)
        .await?;
    Ok(Json(MessageResponse::new("Product removed from cart")))
}

/// Empty the cart.
///
/// POST /api/cart/clear
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<MessageResponse>> {
    CartService::new(state.pool()).clear(user.id).await?;
    Ok(Json(MessageResponse::new("Cart cleared")))
}
