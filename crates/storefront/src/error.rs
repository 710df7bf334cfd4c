//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. JSON handlers return `Result<T, AppError>`;
//! every error body is `{"error": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use greengrocer_core::api::ErrorResponse;

use crate::db::RepositoryError;
use crate::services::{AuthError, CartError, CatalogError, CheckoutError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart write rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog write rejected.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Order could not be placed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A template failed to render.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const INTERNAL: &str = "Internal server error";

impl AppError {
    /// Whether this is a server-side failure worth reporting.
    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists(_) => StatusCode::CONFLICT,
                AuthError::InvalidUsername(_)
                | AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Cart(err) => match err {
                CartError::InvalidQuantity | CartError::InsufficientStock { .. } => {
                    StatusCode::BAD_REQUEST
                }
                CartError::ProductNotFound => StatusCode::NOT_FOUND,
                CartError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Catalog(err) => match err {
                CatalogError::Invalid(_) => StatusCode::BAD_REQUEST,
                CatalogError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
                CatalogError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::Validation(_) | CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::InsufficientStock { .. } => StatusCode::CONFLICT,
                CheckoutError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message shown to the user. Internal details are never exposed.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            return INTERNAL.to_string();
        }
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Catalog(CatalogError::Repository(RepositoryError::NotFound)) => {
                "Product not found".to_string()
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    "Invalid credentials".to_string()
                }
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::WeakPassword(msg)
                | AuthError::InvalidUsername(msg)
                | AuthError::UserAlreadyExists(msg) => msg.clone(),
                AuthError::Repository(_) | AuthError::PasswordHash => INTERNAL.to_string(),
            },
            Self::Cart(err) => err.to_string(),
            Self::Catalog(err) => err.to_string(),
            Self::Checkout(err) => err.to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
            Self::RateLimited => "Too many requests, please slow down".to_string(),
            Self::Database(_) | Self::Template(_) | Self::Internal(_) => INTERNAL.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
