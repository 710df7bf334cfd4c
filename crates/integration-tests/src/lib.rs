//! Integration tests for Greengrocer.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare a database and start the server
//! cargo run -p greengrocer-cli -- migrate
//! cargo run -p greengrocer-cli -- seed
//! cargo run -p greengrocer-storefront
//!
//! # Run integration tests against it
//! GROCER_BASE_URL=http://localhost:5000 cargo test -p greengrocer-integration-tests -- --ignored
//! ```
//!
//! Every test registers its own user, so runs do not interfere with each
//! other or with existing data beyond the products they buy.

#![allow(clippy::missing_panics_doc)]

use greengrocer_client::{ClientConfig, GreengrocerClient};
use greengrocer_core::api::{Product, UserRecord};
use uuid::Uuid;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("GROCER_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// A client with nobody logged in.
#[must_use]
pub fn anonymous_client() -> GreengrocerClient {
    let config = ClientConfig::new(&base_url()).expect("GROCER_BASE_URL must be a valid URL");
    GreengrocerClient::new(config).expect("Failed to build client")
}

/// Credentials of a throwaway account.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl TestAccount {
    #[must_use]
    pub fn unique() -> Self {
        let tag = Uuid::new_v4().simple();
        Self {
            username: format!("shopper_{tag}"),
            email: format!("shopper_{tag}@example.com"),
            password: "correct horse battery".to_string(),
        }
    }
}

/// Register a fresh account and log in as it.
pub async fn logged_in_client() -> (GreengrocerClient, UserRecord) {
    let client = anonymous_client();
    let account = TestAccount::unique();
    client
        .auth()
        .register(&account.username, &account.email, &account.password)
        .await
        .expect("Registration failed");
    let user = client
        .auth()
        .login(&account.email, &account.password)
        .await
        .expect("Login failed");
    (client, user)
}

/// A product with at least `quantity` units in stock.
pub async fn product_in_stock(client: &GreengrocerClient, quantity: i32) -> Product {
    client
        .products()
        .list(&Default::default())
        .await
        .expect("Failed to list products")
        .into_iter()
        .find(|p| p.stock >= quantity)
        .expect("No product with enough stock; run `gg-cli seed`")
}
