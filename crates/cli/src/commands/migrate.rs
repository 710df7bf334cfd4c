//! Database migration command.
//!
//! Schema migrations live in `crates/storefront/migrations/` and are
//! embedded at compile time. The session table belongs to
//! `tower-sessions-sqlx-store` and is created by its own migration.

use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;

use super::CommandError;

/// Run schema migrations, then create the session table.
///
/// # Errors
///
/// Returns an error if any migration fails.
pub async fn run(pool: &PgPool) -> Result<(), CommandError> {
    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(pool).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
