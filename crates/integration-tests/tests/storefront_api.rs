//! End-to-end tests of the JSON API through `greengrocer-client`.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database
//! - The storefront running at `GROCER_BASE_URL` (default http://localhost:5000)
//!
//! Run with: cargo test -p greengrocer-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use greengrocer_client::ClientError;
use greengrocer_core::api::CheckoutRequest;
use greengrocer_core::{OrderStatus, PaymentDetails, PaymentMethod, PaymentStatus, ProductId};
use greengrocer_integration_tests::{
    TestAccount, anonymous_client, base_url, logged_in_client, product_in_stock,
};

// ============================================================================
// Health & Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health() {
    let resp = reqwest::get(format!("{}/health", base_url())).await.unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_register_login_logout() {
    let client = anonymous_client();
    let account = TestAccount::unique();

    let message = client
        .auth()
        .register(&account.username, &account.email, &account.password)
        .await
        .unwrap();
    assert_eq!(message, "Registration successful! Please login.");

    let user = client
        .auth()
        .login(&account.email, &account.password)
        .await
        .unwrap();
    assert_eq!(user.username, account.username);
    assert!(client.is_logged_in());
    assert_eq!(client.auth().me().await.unwrap().id, user.id);

    client.auth().logout().await.unwrap();
    assert!(!client.is_logged_in());
    let err = client.auth().me().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_duplicate_registration_is_rejected() {
    let client = anonymous_client();
    let account = TestAccount::unique();
    client
        .auth()
        .register(&account.username, &account.email, &account.password)
        .await
        .unwrap();

    let err = client
        .auth()
        .register(&account.username, "other@example.com", &account.password)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.to_string(), "Username already exists");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_wrong_password() {
    let client = anonymous_client();
    let err = client
        .auth()
        .login("nobody@example.com", "not the password")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_search() {
    let client = anonymous_client();
    assert!(client.products().search("").await.unwrap().is_empty());

    let product = product_in_stock(&client, 1).await;
    let needle = product.name.to_lowercase();
    let found = client.products().search(&needle).await.unwrap();
    assert!(found.iter().any(|p| p.id == product.id));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_product() {
    let err = anonymous_client()
        .products()
        .get(ProductId::new(i32::MAX))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Product not found");
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_cart_requires_login_on_server() {
    let resp = reqwest::Client::new()
        .post(format!("{}/api/cart/add", base_url()))
        .header("content-type", "application/json")
        .body(r#"{"product_id":1,"quantity":1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = serde_json::from_str(&resp.text().await.unwrap()).unwrap();
    assert_eq!(body["error"], "Please login first");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_cart_accumulates_and_totals() {
    let (client, _user) = logged_in_client().await;
    let product = product_in_stock(&client, 3).await;

    client.cart().add(product.id, 1).await.unwrap();
    client.cart().add(product.id, 2).await.unwrap();

    let cart = client.cart().get().await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.total, product.price * Decimal::from(3));

    client.cart().remove(product.id).await.unwrap();
    // Removing twice is fine
    client.cart().remove(product.id).await.unwrap();
    assert!(client.cart().get().await.unwrap().items.is_empty());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_cart_rejects_more_than_stock() {
    let (client, _user) = logged_in_client().await;
    let product = product_in_stock(&client, 1).await;

    let err = client
        .cart()
        .add(product.id, product.stock + 1)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("left in stock"));
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_empty_cart() {
    let (client, _user) = logged_in_client().await;
    let err = client
        .orders()
        .checkout(&CheckoutRequest {
            delivery_address: "4 Orchard Lane".to_string(),
            payment: PaymentDetails::CashOnDelivery,
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cart is empty");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_with_invalid_card_never_reaches_server() {
    let (client, _user) = logged_in_client().await;
    let err = client
        .orders()
        .checkout(&CheckoutRequest {
            delivery_address: "4 Orchard Lane".to_string(),
            payment: PaymentDetails::Card {
                card_number: "4242".to_string(),
                card_holder: "Asha".to_string(),
                expiry: "12/99".to_string(),
                cvv: "123".to_string(),
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(client.orders().list().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_cash_on_delivery() {
    let (client, _user) = logged_in_client().await;
    let product = product_in_stock(&client, 1).await;
    client.cart().add(product.id, 1).await.unwrap();

    let placed = client
        .orders()
        .checkout(&CheckoutRequest {
            delivery_address: "4 Orchard Lane".to_string(),
            payment: PaymentDetails::CashOnDelivery,
        })
        .await
        .unwrap();
    assert_eq!(placed.total, product.price);
    assert_eq!(placed.status, OrderStatus::Pending);
    assert_eq!(placed.payment_status, PaymentStatus::Pending);

    // Cart is emptied by checkout
    assert!(client.cart().get().await.unwrap().items.is_empty());

    let order = client.orders().get(placed.order_id).await.unwrap();
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].price, product.price);

    let payments = client.orders().payments().await.unwrap();
    assert_eq!(payments[0].order_id, placed.order_id);
    assert_eq!(payments[0].method, PaymentMethod::CashOnDelivery);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_upi_confirms_order() {
    let (client, _user) = logged_in_client().await;
    let product = product_in_stock(&client, 1).await;
    client.cart().add(product.id, 1).await.unwrap();

    let placed = client
        .orders()
        .checkout(&CheckoutRequest {
            delivery_address: "4 Orchard Lane".to_string(),
            payment: PaymentDetails::Upi {
                upi_id: "shopper@okbank".to_string(),
            },
        })
        .await
        .unwrap();
    assert_eq!(placed.status, OrderStatus::Confirmed);
    assert_eq!(placed.payment_status, PaymentStatus::Completed);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_orders_are_private() {
    let (owner, _user) = logged_in_client().await;
    let product = product_in_stock(&owner, 1).await;
    owner.cart().add(product.id, 1).await.unwrap();
    let placed = owner
        .orders()
        .checkout(&CheckoutRequest {
            delivery_address: "4 Orchard Lane".to_string(),
            payment: PaymentDetails::CashOnDelivery,
        })
        .await
        .unwrap();

    let (stranger, _user) = logged_in_client().await;
    let err = stranger.orders().get(placed.order_id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

// ============================================================================
// Admin & Fragments
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_customers_cannot_manage_products() {
    let (client, _user) = logged_in_client().await;
    let err = client.admin().list_products().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.to_string(), "Admin access required");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_product_grid_fragment() {
    let html = reqwest::get(format!("{}/fragments/products", base_url()))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("data-product-id"));
    assert!(html.contains(r#"hx-post="/fragments/cart/add""#));
}
