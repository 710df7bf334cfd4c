//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in user (or an admin) in route
//! handlers. How a missing login is reported depends on who is asking:
//! JSON for `/api/*`, a notification fragment for `/fragments/*`, and a
//! redirect to the login page for everything else.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use greengrocer_core::api::ErrorResponse;

use crate::models::CurrentUser;
use crate::models::session::keys;
use crate::routes::fragments::Notification;

/// Message for API calls without a session.
pub const LOGIN_REQUIRED: &str = "Please login first";
/// Message for cart actions without a session.
pub const CART_LOGIN_REQUIRED: &str = "Please login to add items to cart";
/// Message for admin routes reached by a customer.
pub const ADMIN_REQUIRED: &str = "Admin access required";

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when authentication is required but missing or insufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to login page (for page requests).
    RedirectToLogin,
    /// JSON 401 (for API requests).
    Unauthorized,
    /// JSON 403 (for API requests by non-admins).
    Forbidden,
    /// Error notification fragment (for HTMX requests).
    Notification(StatusCode, &'static str),
}

impl AuthRejection {
    fn missing_login(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Unauthorized
        } else if path.starts_with("/fragments/cart") || path.starts_with("/fragments/checkout") {
            Self::Notification(StatusCode::UNAUTHORIZED, CART_LOGIN_REQUIRED)
        } else if path.starts_with("/fragments/") {
            Self::Notification(StatusCode::UNAUTHORIZED, LOGIN_REQUIRED)
        } else {
            Self::RedirectToLogin
        }
    }

    fn not_admin(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Forbidden
        } else if path.starts_with("/fragments/") {
            Self::Notification(StatusCode::FORBIDDEN, ADMIN_REQUIRED)
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: LOGIN_REQUIRED.to_string(),
                }),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    error: ADMIN_REQUIRED.to_string(),
                }),
            )
                .into_response(),
            Self::Notification(status, message) => {
                (status, Notification::error(message)).into_response()
            }
        }
    }
}

/// Path as the client sent it; nested routers only see the suffix.
fn request_path(parts: &Parts) -> &str {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |OriginalUri(uri)| uri.path())
}

async fn session_user(parts: &Parts) -> Option<CurrentUser> {
    // Get the session from extensions (set by SessionManagerLayer)
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| AuthRejection::missing_login(request_path(parts)))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = session_user(parts)
            .await
            .ok_or_else(|| AuthRejection::missing_login(request_path(parts)))?;
        if !user.is_admin() {
            return Err(AuthRejection::not_admin(request_path(parts)));
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await))
    }
}

/// Helper to set the current user in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to clear the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
