//! Session login, registration and logout over JSON.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use greengrocer_core::api::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserRecord};

use super::ApiJson;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Register a customer account.
///
/// POST /api/register
///
/// # Errors
///
/// 400 for invalid input, 409 if the username or email is taken.
#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    AuthService::new(state.pool())
        .register(&body.username, &body.email, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Registration successful! Please login.")),
    ))
}

/// Log in with email and password.
///
/// POST /api/login
///
/// # Errors
///
/// 401 `Invalid credentials` for an unknown email or a wrong password.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful!".to_string(),
        user: user.to_record(),
    }))
}

/// Log out and discard the session.
///
/// POST /api/logout
///
/// # Errors
///
/// 500 if the session store fails.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<MessageResponse>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();

    Ok(Json(MessageResponse::new("Logged out successfully!")))
}

/// The signed-in user.
///
/// GET /api/me
pub async fn me(RequireAuth(user): RequireAuth) -> Json<UserRecord> {
    Json(user.to_record())
}
