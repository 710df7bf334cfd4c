//! Business logic services.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use catalog::{Catalog, CatalogError};
pub use checkout::{CheckoutError, CheckoutService};
