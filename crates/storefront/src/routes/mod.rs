//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Storefront page
//! GET  /login                  - Login and registration page
//! GET  /admin                  - Product management page (admin)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Auth (HTML forms, redirects)
//! POST /auth/login             - Login action
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Fragments (HTMX, return markup)
//! GET  /fragments/products                 - Product grid (?q=, ?featured=)
//! GET  /fragments/cart                     - Cart panel
//! GET  /fragments/cart/count               - Cart count badge
//! POST /fragments/cart/add                 - Add to cart (badge + notification)
//! POST /fragments/cart/remove              - Remove from cart (cart panel)
//! GET  /fragments/checkout                 - Checkout form (?method=)
//! POST /fragments/checkout                 - Place order (confirmation)
//! GET  /fragments/admin/products           - Admin product table
//! POST /fragments/admin/products           - Create product
//! GET  /fragments/admin/products/new       - Blank product form
//! GET  /fragments/admin/products/:id/edit  - Filled product form
//! POST /fragments/admin/products/:id       - Update product
//! DELETE /fragments/admin/products/:id     - Delete product
//!
//! # JSON API
//! /api/*                       - See [`api`]
//! ```

pub mod api;
pub mod auth;
pub mod fragments;
pub mod pages;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::middleware::{
    api_rate_limiter, auth_rate_limiter, create_session_layer, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Create the HTML form auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
}

/// Create the HTMX fragment routes router.
pub fn fragment_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(fragments::products::grid))
        // Cart
        .route("/cart", get(fragments::cart::panel))
        .route("/cart/count", get(fragments::cart::count))
        .route("/cart/add", post(fragments::cart::add))
        .route("/cart/remove", post(fragments::cart::remove))
        // Checkout
        .route(
            "/checkout",
            get(fragments::checkout::form).post(fragments::checkout::submit),
        )
        // Admin
        .route(
            "/admin/products",
            get(fragments::admin::products).post(fragments::admin::create_product),
        )
        .route("/admin/products/new", get(fragments::admin::new_product))
        .route(
            "/admin/products/{id}/edit",
            get(fragments::admin::edit_product),
        )
        .route(
            "/admin/products/{id}",
            post(fragments::admin::update_product).delete(fragments::admin::delete_product),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Pages
        .route("/", get(pages::index))
        .route("/login", get(auth::login_page))
        .route("/admin", get(pages::admin))
        // Health
        .route("/health", get(pages::health))
        .route("/health/ready", get(pages::readiness))
        // Auth forms
        .nest("/auth", auth_routes())
        // HTMX fragments
        .nest("/fragments", fragment_routes())
        // JSON API
        .nest("/api", api::routes().layer(api_rate_limiter()))
}

/// Build the complete application with its middleware stack.
///
/// The server passes a `PostgresStore`; tests pass a `MemoryStore`.
pub fn app<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(store, state.config());
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .merge(routes())
        .nest_service("/static", static_dir)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::StorefrontConfig;

    fn test_app() -> Router {
        let config = StorefrontConfig::from_lookup(|key| match key {
            "GROCER_DATABASE_URL" => Some("postgres://grocer@localhost/grocer_test".to_string()),
            "GROCER_BASE_URL" => Some("http://localhost:5000".to_string()),
            _ => None,
        })
        .unwrap();
        // Never connects unless a handler touches the database.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://grocer@localhost/grocer_test")
            .unwrap();
        app(AppState::new(config, pool), MemoryStore::default())
    }

    fn request(method: &str, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "203.0.113.9")
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(request("GET", "/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_api_cart_requires_login() {
        let response = test_app()
            .oneshot(request("GET", "/api/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, r#"{"error":"Please login first"}"#);
    }

    #[tokio::test]
    async fn test_api_admin_requires_login() {
        let response = test_app()
            .oneshot(
                request("GET", "/api/admin/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_fragment_add_to_cart_requires_login() {
        let response = test_app()
            .oneshot(
                request("POST", "/fragments/cart/add")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("product_id=1&quantity=1"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["hx-reswap"], "none");
        let html = body_text(response).await;
        assert!(html.contains("Please login to add items to cart"));
        assert!(html.contains("afterbegin:#notifications"));
    }

    #[tokio::test]
    async fn test_anonymous_cart_panel_asks_for_login() {
        let response = test_app()
            .oneshot(request("GET", "/fragments/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Please login to see your cart."));
    }

    #[tokio::test]
    async fn test_admin_page_redirects_visitors() {
        let response = test_app()
            .oneshot(request("GET", "/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_index_renders_for_visitor() {
        let response = test_app()
            .oneshot(request("GET", "/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"id="product-grid""#));
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_json_error() {
        let response = test_app()
            .oneshot(
                request("POST", "/api/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"].is_string());
    }

    async fn api_error(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = test_app()
            .oneshot(request("GET", uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = serde_json::from_str(&body_text(response).await).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_unparsable_product_id_is_a_json_error() {
        let (status, body) = api_error("/api/products/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("abc"));
    }

    #[tokio::test]
    async fn test_bad_query_string_is_a_json_error() {
        let (status, body) = api_error("/api/products?featured=maybe").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_api_endpoint_is_a_json_404() {
        let (status, body) = api_error("/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }
}
