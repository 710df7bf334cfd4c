//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use greengrocer_storefront::db::{self, RepositoryError};
use greengrocer_storefront::services::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Account creation or promotion failed.
    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Connect using `GROCER_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if neither variable is set or the database is unreachable.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("GROCER_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("GROCER_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
