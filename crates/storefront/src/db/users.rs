//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use greengrocer_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::User;

/// Conflict messages for a registration that collides with an existing account.
pub const USERNAME_TAKEN: &str = "Username already exists";
pub const EMAIL_TAKEN: &str = "Email already exists";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    email: String,
    role: UserRole,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            username: row.username,
            email,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, role, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user and their password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(
            r"
            SELECT id, username, email, role, created_at, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` with [`USERNAME_TAKEN`] or
    /// [`EMAIL_TAKEN`] if either is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, role, created_at
            ",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                let message = if db_err.constraint() == Some("users_username_key") {
                    USERNAME_TAKEN
                } else {
                    EMAIL_TAKEN
                };
                return RepositoryError::Conflict(message.to_owned());
            }
            RepositoryError::Database(e)
        })?;

        User::try_from(row)
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this email.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_role(&self, email: &Email, role: UserRole) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE email = $1")
            .bind(email)
            .bind(role)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
