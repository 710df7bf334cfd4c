//! Admin user management commands.

use sqlx::PgPool;

use greengrocer_core::{UserId, UserRole};
use greengrocer_storefront::services::AuthService;

use super::CommandError;

/// Create a new admin user.
///
/// # Errors
///
/// Returns the validation or duplicate error from account creation.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserId, CommandError> {
    tracing::info!("Creating admin user: {} ({})", username, email);

    let user = AuthService::new(pool)
        .create_user(username, email, password, UserRole::Admin)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}

/// Grant the admin role to an existing user.
///
/// # Errors
///
/// Returns an error if no user has this email.
pub async fn promote(pool: &PgPool, email: &str) -> Result<(), CommandError> {
    AuthService::new(pool).promote_to_admin(email).await?;
    tracing::info!("{} is now an admin", email);
    tracing::warn!("Existing sessions keep the old role until the user logs in again.");
    Ok(())
}
