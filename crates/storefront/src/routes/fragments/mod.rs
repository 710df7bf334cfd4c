//! HTML fragments swapped into the page by HTMX.
//!
//! Every fragment handler returns markup, never JSON. Failures become an
//! error [`Notification`] carrying the same message the JSON API would put
//! in its `error` field.
//!
//! Notifications are rendered as out-of-band swaps into `#notifications`,
//! so they can ride along with any fragment. A response that is only a
//! notification also sets `HX-Reswap: none` to leave the target untouched.

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod products;

use askama::Template;
use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::services::{CartError, CatalogError, CheckoutError};

/// Event fired whenever the cart changes; the count badge and cart panel
/// listen for it.
pub const CART_UPDATED: &str = "cart-updated";

const HX_RESWAP: HeaderName = HeaderName::from_static("hx-reswap");
const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// Transient success or error message.
#[derive(Debug, Clone, Template)]
#[template(path = "partials/notification.html")]
pub struct Notification {
    pub kind: &'static str,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success",
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            message: message.into(),
        }
    }
}

impl IntoResponse for Notification {
    fn into_response(self) -> Response {
        match self.render() {
            Ok(body) => (
                [(HX_RESWAP, HeaderValue::from_static("none"))],
                Html(body),
            )
                .into_response(),
            Err(e) => FragmentError(AppError::Template(e)).into_response(),
        }
    }
}

/// Render a fragment followed by an out-of-band notification.
///
/// # Errors
///
/// Returns `AppError::Template` if either template fails to render.
pub fn with_notification(
    fragment: &impl Template,
    notification: &Notification,
) -> Result<Html<String>, AppError> {
    let mut body = fragment.render()?;
    body.push_str(&notification.render()?);
    Ok(Html(body))
}

/// Response headers firing a client-side HTMX event.
#[must_use]
pub fn trigger(event: &'static str) -> [(HeaderName, HeaderValue); 1] {
    [(HX_TRIGGER, HeaderValue::from_static(event))]
}

/// Error from a fragment handler, rendered as an error notification.
#[derive(Debug)]
pub struct FragmentError(pub AppError);

impl IntoResponse for FragmentError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self.0);
            tracing::error!(
                error = %self.0,
                sentry_event_id = %event_id,
                "Fragment error"
            );
        }
        let message = self.0.public_message();
        match Notification::error(message).render() {
            Ok(body) => (
                status,
                [(HX_RESWAP, HeaderValue::from_static("none"))],
                Html(body),
            )
                .into_response(),
            // Rendering the notification itself failed; nothing left to swap.
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

macro_rules! fragment_error_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for FragmentError {
                fn from(err: $source) -> Self {
                    Self(err.into())
                }
            }
        )*
    };
}

fragment_error_from!(
    AppError,
    RepositoryError,
    CartError,
    CatalogError,
    CheckoutError,
    askama::Error,
);

/// Result type for fragment handlers.
pub type FragmentResult<T = Response> = Result<T, FragmentError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_notification_is_out_of_band() {
        let html = Notification::success("Product added to cart!").render().unwrap();
        assert!(html.contains(r#"hx-swap-oob="afterbegin:#notifications""#));
        assert!(html.contains("notification success"));
        assert!(html.contains("Product added to cart!"));
    }

    #[test]
    fn test_notification_escapes_message() {
        let html = Notification::error("<script>").render().unwrap();
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_standalone_notification_does_not_swap_target() {
        let response = Notification::error("Please login first").into_response();
        assert_eq!(response.headers().get("hx-reswap").unwrap(), "none");
    }

    #[tokio::test]
    async fn test_fragment_error_keeps_status_and_message() {
        let response =
            FragmentError::from(CartError::InsufficientStock { available: 2 }).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        assert!(body.contains("notification error"));
        assert!(body.contains("Only 2 left in stock"));
    }

    #[tokio::test]
    async fn test_fragment_error_hides_internal_details() {
        let response =
            FragmentError(AppError::Internal("connection refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("Internal server error"));
        assert!(!body.contains("connection refused"));
    }
}
