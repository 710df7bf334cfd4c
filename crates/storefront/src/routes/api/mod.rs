//! JSON API consumed by `greengrocer-client` and other programmatic callers.
//!
//! Every error body is `{"error": "<message>"}`, including malformed JSON
//! bodies, unparsable path segments and query strings (see [`ApiJson`],
//! [`ApiPath`], [`ApiQuery`]) and unknown endpoints.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
    routing::{delete, get, post},
};

use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections use the API error shape.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string extractor whose rejections use the API error shape.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// Login and registration, rate limited per client IP.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
}

/// Admin-only routes.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/products/{id}",
            delete(admin::delete_product).put(admin::update_product),
        )
        .route("/orders/{id}/status", post(admin::update_order_status))
}

/// Create the `/api` router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        // Catalog
        .route("/products", get(products::list))
        .route("/products/{id}", get(products::show))
        .route("/search", get(products::search))
        // Cart
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/clear", post(cart::clear))
        // Orders and payments
        .route("/checkout", post(checkout::checkout))
        .route("/orders", get(checkout::orders))
        .route("/orders/{id}", get(checkout::order))
        .route("/payments", get(checkout::payments))
        .nest("/admin", admin_routes())
        .fallback(not_found)
}
