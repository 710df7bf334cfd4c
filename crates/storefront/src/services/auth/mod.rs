//! Authentication service.
//!
//! Password registration and login with Argon2id hashes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use greengrocer_core::{Email, UserId, UserRole};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Allowed username length, in characters.
const USERNAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=80;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` for bad input.
    /// Returns `AuthError::UserAlreadyExists` if the username or email is taken.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        self.create_user(username, email, password, UserRole::Customer)
            .await
    }

    /// Create a user with an explicit role (used by the CLI for admins).
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let username = validate_username(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(username, &email, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(which) => AuthError::UserAlreadyExists(which),
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // A malformed email can't belong to anyone
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no such user exists.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Grant the admin role to an existing user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no user has this email.
    pub async fn promote_to_admin(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        self.users
            .set_role(&email, UserRole::Admin)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }
}

/// Validate and trim a username.
fn validate_username(username: &str) -> Result<&str, AuthError> {
    let username = username.trim();
    if !USERNAME_LENGTH.contains(&username.chars().count()) {
        return Err(AuthError::InvalidUsername(format!(
            "Username must be between {} and {} characters",
            USERNAME_LENGTH.start(),
            USERNAME_LENGTH.end()
        )));
    }
    Ok(username)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
