//! User domain types.

use chrono::{DateTime, Utc};

use greengrocer_core::api::UserRecord;
use greengrocer_core::{Email, UserId, UserRole};

/// A storefront account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The record returned to clients after login.
    #[must_use]
    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            id: self.id,
            username: self.username.clone(),
            email: self.email.to_string(),
            role: self.role,
        }
    }
}
