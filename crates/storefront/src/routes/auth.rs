//! HTML form login, registration and logout.
//!
//! These handlers answer with redirects. Outcomes travel to the login page
//! as short codes in `?error=` or `?success=`, which [`LoginTemplate`] turns
//! into messages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::users::{EMAIL_TAKEN, USERNAME_TAKEN};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::pages::HeaderUser;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Query parameters for status messages.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login and registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub user: Option<HeaderUser>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

impl LoginTemplate {
    #[must_use]
    pub fn from_query(query: &MessageQuery) -> Self {
        Self {
            user: None,
            error: query.error.as_deref().and_then(error_message),
            success: query.success.as_deref().and_then(success_message),
        }
    }
}

fn error_message(code: &str) -> Option<&'static str> {
    Some(match code {
        "credentials" => "Invalid credentials",
        "username" => "Username must be between 3 and 80 characters",
        "email" => "Please enter a valid email address",
        "password" => "Password must be at least 8 characters",
        "username_taken" => USERNAME_TAKEN,
        "email_taken" => EMAIL_TAKEN,
        "session" => "Could not start your session, please try again",
        "failed" => "Something went wrong, please try again",
        _ => return None,
    })
}

fn success_message(code: &str) -> Option<&'static str> {
    Some(match code {
        "registered" => "Registration successful! Please login.",
        "logged_out" => "Logged out successfully!",
        _ => return None,
    })
}

/// Short code for a failed registration.
fn registration_error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::InvalidUsername(_) => "username",
        AuthError::InvalidEmail(_) => "email",
        AuthError::WeakPassword(_) => "password",
        AuthError::UserAlreadyExists(which) if which == USERNAME_TAKEN => "username_taken",
        AuthError::UserAlreadyExists(_) => "email_taken",
        _ => "failed",
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        user: user.as_ref().map(HeaderUser::from),
        ..LoginTemplate::from_query(&query)
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            return Redirect::to("/login?error=credentials").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            return Redirect::to("/login?error=failed").into_response();
        }
    };

    if let Err(e) = set_current_user(&session, &CurrentUser::from(&user)).await {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to("/login?error=session").into_response();
    }
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "User logged in");

    let destination = if user.role.is_admin() { "/admin" } else { "/" };
    Redirect::to(destination).into_response()
}

/// Handle registration form submission.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    match AuthService::new(state.pool())
        .register(&form.username, &form.email, &form.password)
        .await
    {
        Ok(_) => Redirect::to("/login?success=registered").into_response(),
        Err(e) => {
            let code = registration_error_code(&e);
            if code == "failed" {
                tracing::error!(error = %e, "Registration failed");
            } else {
                tracing::warn!(error = %e, "Registration rejected");
            }
            Redirect::to(&format!("/login?error={code}")).into_response()
        }
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to("/login?success=logged_out").into_response()
}
