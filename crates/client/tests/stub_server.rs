//! Client behaviour against an in-process stand-in for the storefront API.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use greengrocer_client::{ClientConfig, ClientError, GreengrocerClient};
use greengrocer_core::api::{CheckoutRequest, ProductQuery};
use greengrocer_core::{PaymentDetails, ProductId};

#[derive(Clone, Default)]
struct Hits(Arc<AtomicUsize>);

impl Hits {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

async fn login(State(hits): State<Hits>, Json(body): Json<Value>) -> impl IntoResponse {
    hits.0.fetch_add(1, Ordering::SeqCst);
    if body["password"] != "correct horse" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "message": "Login successful!",
            "user": { "id": 7, "username": "asha", "email": body["email"], "role": "customer" }
        })),
    )
}

async fn logout(State(hits): State<Hits>) -> Json<Value> {
    hits.0.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "message": "Logged out successfully!" }))
}

async fn add_to_cart(State(hits): State<Hits>, Json(body): Json<Value>) -> impl IntoResponse {
    hits.0.fetch_add(1, Ordering::SeqCst);
    if body["quantity"].as_i64().unwrap_or(0) > 2 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Only 2 left in stock" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "message": "Product added to cart!" })),
    )
}

async fn cart(State(hits): State<Hits>) -> Json<Value> {
    hits.0.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "items": [{
            "product_id": 1,
            "name": "Fresh Apples",
            "price": 2.99,
            "quantity": 2,
            "image_url": "/static/images/default.png",
            "item_total": 5.98
        }],
        "total": 5.98,
        "item_count": 2
    }))
}

async fn products(State(hits): State<Hits>, uri: axum::http::Uri) -> Json<Value> {
    hits.0.fetch_add(1, Ordering::SeqCst);
    let featured = uri.query().is_some_and(|q| q.contains("featured=true"));
    Json(json!([{
        "id": 1,
        "name": if featured { "Featured Apples" } else { "Fresh Apples" },
        "description": "Crisp",
        "price": 2.99,
        "stock": 40,
        "image_url": "/static/images/default.png",
        "is_featured": featured
    }]))
}

async fn html_page(State(hits): State<Hits>) -> impl IntoResponse {
    hits.0.fetch_add(1, Ordering::SeqCst);
    ([(header::CONTENT_TYPE, "text/html")], "<p>maintenance</p>")
}

async fn bare_failure(State(hits): State<Hits>) -> StatusCode {
    hits.0.fetch_add(1, Ordering::SeqCst);
    StatusCode::BAD_GATEWAY
}

async fn checkout(State(hits): State<Hits>) -> impl IntoResponse {
    hits.0.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::CREATED,
        Json(json!({
            "order_id": 42,
            "total": 5.98,
            "status": "confirmed",
            "payment_status": "completed"
        })),
    )
}

async fn spawn_stub() -> (GreengrocerClient, Hits) {
    let hits = Hits::default();
    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/cart", get(cart))
        .route("/api/cart/add", post(add_to_cart))
        .route("/api/products", get(products))
        .route("/api/me", get(html_page))
        .route("/api/orders", get(bare_failure))
        .route("/api/checkout", post(checkout))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig::new(&format!("http://{addr}")).unwrap();
    (GreengrocerClient::new(config).unwrap(), hits)
}

fn checkout_request(address: &str) -> CheckoutRequest {
    CheckoutRequest {
        delivery_address: address.to_string(),
        payment: PaymentDetails::CashOnDelivery,
    }
}

#[tokio::test]
async fn test_login_stores_user_and_logout_clears_it() {
    let (client, _hits) = spawn_stub().await;
    assert!(!client.is_logged_in());

    let user = client
        .auth()
        .login("asha@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(user.username, "asha");
    assert!(client.is_logged_in());
    assert_eq!(client.current_user().unwrap(), Some(user));

    client.auth().logout().await.unwrap();
    assert!(!client.is_logged_in());
}

#[tokio::test]
async fn test_failed_login_surfaces_server_message() {
    let (client, _hits) = spawn_stub().await;
    let err = client
        .auth()
        .login("asha@example.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(err.status(), Some(401));
    assert!(!client.is_logged_in());
}

#[tokio::test]
async fn test_add_to_cart_logged_out_sends_nothing() {
    let (client, hits) = spawn_stub().await;
    let err = client.cart().add(ProductId::new(1), 1).await.unwrap_err();
    assert!(matches!(err, ClientError::NotLoggedIn));
    assert_eq!(err.to_string(), "Please login to add items to cart");
    assert_eq!(hits.count(), 0);
}

#[tokio::test]
async fn test_cart_round_trip_when_logged_in() {
    let (client, _hits) = spawn_stub().await;
    client
        .auth()
        .login("asha@example.com", "correct horse")
        .await
        .unwrap();

    let message = client.cart().add(ProductId::new(1), 2).await.unwrap();
    assert_eq!(message, "Product added to cart!");

    let err = client.cart().add(ProductId::new(1), 5).await.unwrap_err();
    assert_eq!(err.to_string(), "Only 2 left in stock");

    let cart = client.cart().get().await.unwrap();
    assert_eq!(cart.item_count, 2);
    assert_eq!(cart.total, Decimal::new(598, 2));
}

#[tokio::test]
async fn test_checkout_with_empty_address_sends_nothing() {
    let (client, hits) = spawn_stub().await;
    client
        .auth()
        .login("asha@example.com", "correct horse")
        .await
        .unwrap();
    let before = hits.count();

    let err = client
        .orders()
        .checkout(&checkout_request("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(err.to_string(), "Please enter a delivery address");
    assert_eq!(hits.count(), before);
}

#[tokio::test]
async fn test_checkout_places_order() {
    let (client, _hits) = spawn_stub().await;
    client
        .auth()
        .login("asha@example.com", "correct horse")
        .await
        .unwrap();

    let placed = client
        .orders()
        .checkout(&checkout_request("4 Orchard Lane"))
        .await
        .unwrap();
    assert_eq!(placed.order_id.to_string(), "42");
}

#[tokio::test]
async fn test_products_pass_query_filters() {
    let (client, _hits) = spawn_stub().await;
    let all = client.products().list(&ProductQuery::default()).await.unwrap();
    assert_eq!(all[0].name, "Fresh Apples");

    let featured = client.products().featured().await.unwrap();
    assert_eq!(featured[0].name, "Featured Apples");
    assert!(featured[0].is_featured);
}

#[tokio::test]
async fn test_html_success_is_rejected() {
    let (client, _hits) = spawn_stub().await;
    let err = client.auth().me().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::UnexpectedContentType { status: 200, .. }
    ));
}

#[tokio::test]
async fn test_failure_without_body_uses_fallback_message() {
    let (client, _hits) = spawn_stub().await;
    let err = client.orders().list().await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed");
    assert_eq!(err.status(), Some(502));
}
