//! Client error type.

use greengrocer_core::CheckoutValidationError;
use thiserror::Error;

use crate::store::StoreError;

/// Message used when the server gives no reason for a failure.
pub const REQUEST_FAILED: &str = "Request failed";

/// Message for cart actions attempted without a stored user.
pub const LOGIN_REQUIRED: &str = "Please login to add items to cart";

/// Errors returned by [`crate::GreengrocerClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status. `message` is the server's
    /// `error` field, or [`REQUEST_FAILED`] when it sent none.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A 2xx response that was not JSON.
    #[error("Unexpected content type {content_type:?} (status {status})")]
    UnexpectedContentType { status: u16, content_type: String },

    /// A JSON response did not have the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// No user is stored, so the request was not sent.
    #[error("{LOGIN_REQUIRED}")]
    NotLoggedIn,

    /// Checkout input failed local validation, so the request was not sent.
    #[error(transparent)]
    Validation(#[from] CheckoutValidationError),

    /// The user store could not be read or written.
    #[error("User store error: {0}")]
    Store(#[from] StoreError),

    /// The configured base URL is not usable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Client configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of a server rejection.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::UnexpectedContentType { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Result type alias for client calls.
pub type Result<T> = std::result::Result<T, ClientError>;
