//! JSON bodies exchanged over `/api`.
//!
//! The storefront serializes these and the client deserializes them, so a
//! change here changes both ends of the wire at once. Money fields travel as
//! JSON numbers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    CheckoutValidationError, DeliveryAddress, OrderId, OrderStatus, PaymentDetails, PaymentId,
    PaymentMethod, PaymentStatus, ProductId, UserId, UserRole,
};

/// Default product image used when a product has none.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/static/images/default.png";

// =============================================================================
// Generic bodies
// =============================================================================

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of writes that return nothing but a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The signed-in user as the client keeps it after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

impl UserRecord {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserRecord,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
    pub image_url: String,
    pub is_featured: bool,
}

/// Query string of `GET /api/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub products: Vec<Product>,
}

/// Body of admin product create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// A product write was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductInputError {
    #[error("Product name is required")]
    EmptyName,
    #[error("Product name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("Price cannot be negative")]
    NegativePrice,
    #[error("Price cannot exceed {max}")]
    PriceTooHigh { max: Decimal },
    #[error("Price cannot have more than two decimal places")]
    PriceTooPrecise,
    #[error("Stock cannot be negative")]
    NegativeStock,
    #[error("Image URL must be at most {max} characters")]
    ImageUrlTooLong { max: usize },
}

impl ProductInput {
    /// Longest accepted product name.
    pub const MAX_NAME_LENGTH: usize = 100;

    /// Longest accepted image URL.
    pub const MAX_IMAGE_URL_LENGTH: usize = 255;

    /// Highest price a `NUMERIC(10, 2)` column holds: 99,999,999.99.
    // 9_999_999_999 split into 32-bit words: 2 * 2^32 + 1_410_065_407.
    pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    /// Check the input and normalize it in place: trims text and replaces a
    /// blank image with [`DEFAULT_PRODUCT_IMAGE`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ProductInputError`] found.
    pub fn normalize(mut self) -> Result<Self, ProductInputError> {
        self.name = self.name.trim().to_owned();
        if self.name.is_empty() {
            return Err(ProductInputError::EmptyName);
        }
        if self.name.chars().count() > Self::MAX_NAME_LENGTH {
            return Err(ProductInputError::NameTooLong {
                max: Self::MAX_NAME_LENGTH,
            });
        }
        if self.price < Decimal::ZERO {
            return Err(ProductInputError::NegativePrice);
        }
        if self.price > Self::MAX_PRICE {
            return Err(ProductInputError::PriceTooHigh {
                max: Self::MAX_PRICE,
            });
        }
        if self.price.normalize().scale() > 2 {
            return Err(ProductInputError::PriceTooPrecise);
        }
        if self.stock < 0 {
            return Err(ProductInputError::NegativeStock);
        }
        self.description = self.description.trim().to_owned();
        self.image_url = self
            .image_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());
        if self
            .image_url
            .as_ref()
            .is_some_and(|url| url.chars().count() > Self::MAX_IMAGE_URL_LENGTH)
        {
            return Err(ProductInputError::ImageUrlTooLong {
                max: Self::MAX_IMAGE_URL_LENGTH,
            });
        }
        Ok(self)
    }

    /// Image to store, falling back to the default image.
    #[must_use]
    pub fn image_or_default(&self) -> &str {
        self.image_url.as_deref().unwrap_or(DEFAULT_PRODUCT_IMAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub id: ProductId,
    pub message: String,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i32,
    pub image_url: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub item_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub item_count: i64,
}

// =============================================================================
// Checkout, orders and payments
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub delivery_address: String,
    pub payment: PaymentDetails,
}

impl CheckoutRequest {
    /// Validate the address and the active payment group.
    ///
    /// # Errors
    ///
    /// Returns the first failing field, address first.
    pub fn validate(&self, today: NaiveDate) -> Result<DeliveryAddress, CheckoutValidationError> {
        let address = DeliveryAddress::parse(&self.delivery_address)?;
        self.payment.validate(today)?;
        Ok(address)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i32,
    /// Unit price when the order was placed.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub order_id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{AddressError, PaymentError};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[test]
    fn test_add_to_cart_quantity_defaults_to_one() {
        let req: AddToCartRequest = serde_json::from_str(r#"{"product_id": 3}"#).unwrap();
        assert_eq!(req.product_id, ProductId::new(3));
        assert_eq!(req.quantity, 1);
    }

    #[test]
    fn test_cart_total_is_a_json_number() {
        let cart = CartResponse {
            items: vec![],
            total: Decimal::new(1545, 2),
            item_count: 0,
        };
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["total"], serde_json::json!(15.45));
    }

    #[test]
    fn test_checkout_validation_checks_address_first() {
        let req = CheckoutRequest {
            delivery_address: "  ".to_string(),
            payment: PaymentDetails::Upi {
                upi_id: "bad".to_string(),
            },
        };
        assert_eq!(
            req.validate(today()),
            Err(CheckoutValidationError::Address(AddressError::Empty))
        );

        let req = CheckoutRequest {
            delivery_address: "4 Orchard Lane".to_string(),
            ..req
        };
        assert_eq!(
            req.validate(today()),
            Err(CheckoutValidationError::Payment(PaymentError::InvalidUpiId))
        );
    }

    #[test]
    fn test_checkout_request_wire_shape() {
        let req: CheckoutRequest = serde_json::from_str(
            r#"{"delivery_address":"4 Orchard Lane","payment":{"method":"cash_on_delivery"}}"#,
        )
        .unwrap();
        assert_eq!(req.validate(today()).unwrap().as_str(), "4 Orchard Lane");
    }

    #[test]
    fn test_product_input_normalize() {
        let input = ProductInput {
            name: "  Kiwi ".to_string(),
            description: String::new(),
            price: Decimal::new(99, 2),
            stock: 10,
            image_url: Some("   ".to_string()),
            is_featured: false,
        };
        let input = input.normalize().unwrap();
        assert_eq!(input.name, "Kiwi");
        assert_eq!(input.image_or_default(), DEFAULT_PRODUCT_IMAGE);
    }

    #[test]
    fn test_product_input_rejects_bad_values() {
        let base = ProductInput {
            name: "Kiwi".to_string(),
            description: String::new(),
            price: Decimal::new(99, 2),
            stock: 10,
            image_url: None,
            is_featured: false,
        };
        let blank = ProductInput {
            name: " ".to_string(),
            ..base.clone()
        };
        assert_eq!(blank.normalize(), Err(ProductInputError::EmptyName));

        let negative = ProductInput {
            price: Decimal::new(-1, 0),
            ..base.clone()
        };
        assert_eq!(negative.normalize(), Err(ProductInputError::NegativePrice));

        let no_stock = ProductInput { stock: -2, ..base };
        assert_eq!(no_stock.normalize(), Err(ProductInputError::NegativeStock));
    }

    #[test]
    fn test_product_input_respects_column_limits() {
        let base = ProductInput {
            name: "Saffron".to_string(),
            description: String::new(),
            price: ProductInput::MAX_PRICE,
            stock: 1,
            image_url: Some(format!("/static/images/{}", "a".repeat(200))),
            is_featured: false,
        };
        assert!(base.clone().normalize().is_ok());

        let pricey = ProductInput {
            price: Decimal::new(1_000_000_000, 0),
            ..base.clone()
        };
        let err = pricey.normalize().unwrap_err();
        assert!(matches!(err, ProductInputError::PriceTooHigh { .. }));
        assert_eq!(err.to_string(), "Price cannot exceed 99999999.99");

        let fractional_cent = ProductInput {
            price: Decimal::new(12_345, 3),
            ..base.clone()
        };
        assert_eq!(
            fractional_cent.normalize(),
            Err(ProductInputError::PriceTooPrecise)
        );

        let trailing_zeros = ProductInput {
            price: Decimal::new(25_000, 4),
            ..base.clone()
        };
        assert!(trailing_zeros.normalize().is_ok());

        let long_image = ProductInput {
            image_url: Some(format!("https://cdn.example.com/{}", "x".repeat(240))),
            ..base
        };
        assert_eq!(
            long_image.normalize(),
            Err(ProductInputError::ImageUrlTooLong { max: 255 })
        );
    }

    #[test]
    fn test_user_record_role_defaults_to_customer() {
        let user: UserRecord =
            serde_json::from_str(r#"{"id":1,"username":"asha","email":"asha@example.com"}"#)
                .unwrap();
        assert!(!user.is_admin());
    }
}
