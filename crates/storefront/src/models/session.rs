//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use greengrocer_core::api::UserRecord;
use greengrocer_core::{Email, UserId, UserRole};

use super::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
/// The role is re-read on login only; promoting a user takes effect on
/// their next sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    pub username: String,
    /// User's email address.
    pub email: Email,
    #[serde(default)]
    pub role: UserRole,
}

impl CurrentUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

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

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
