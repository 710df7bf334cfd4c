//! Core types for Greengrocer.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod payment;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use payment::{
    AddressError, CheckoutValidationError, DeliveryAddress, PaymentDetails, PaymentError,
    PaymentFields, SUPPORTED_BANKS, SUPPORTED_WALLETS,
};
pub use price::{CurrencyCode, Price};
pub use status::*;
