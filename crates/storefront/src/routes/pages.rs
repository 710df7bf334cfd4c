//! Full-page routes. Page bodies load their content through fragments.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::filters;
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Signed-in user as shown in the header.
#[derive(Debug, Clone)]
pub struct HeaderUser {
    pub username: String,
    pub is_admin: bool,
}

impl From<&CurrentUser> for HeaderUser {
    fn from(user: &CurrentUser) -> Self {
        Self {
            username: user.username.clone(),
            is_admin: user.is_admin(),
        }
    }
}

/// Storefront page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user: Option<HeaderUser>,
}

/// Admin page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminTemplate {
    pub user: Option<HeaderUser>,
}

/// Display the storefront page.
pub async fn index(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    IndexTemplate {
        user: user.as_ref().map(HeaderUser::from),
    }
}

/// Display the admin page.
pub async fn admin(RequireAdmin(user): RequireAdmin) -> impl IntoResponse {
    AdminTemplate {
        user: Some(HeaderUser::from(&user)),
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_index_for_visitor_offers_login() {
        let html = IndexTemplate { user: None }.render().unwrap();
        assert!(html.contains(r#"id="login-btn""#));
        assert!(html.contains(r#"hx-get="/fragments/products?featured=true""#));
        assert!(html.contains(r#"id="shopping-cart""#));
        assert!(!html.contains(r#"href="/admin""#));
    }

    #[test]
    fn test_index_for_admin_links_admin_page() {
        let html = IndexTemplate {
            user: Some(HeaderUser {
                username: "grocer".to_string(),
                is_admin: true,
            }),
        }
        .render()
        .unwrap();
        assert!(html.contains("grocer"));
        assert!(html.contains(r#"href="/admin""#));
        assert!(html.contains(r#"action="/auth/logout""#));
    }

    #[test]
    fn test_admin_page_loads_table() {
        let html = AdminTemplate {
            user: Some(HeaderUser {
                username: "grocer".to_string(),
                is_admin: true,
            }),
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"hx-get="/fragments/admin/products""#));
        assert!(html.contains(r#"hx-get="/fragments/admin/products/new""#));
    }
}
