//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use veriquick_core::{Email, UserId, UserRole};

/// An account holder (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Phone number, if provided.
    pub phone: Option<String>,
    /// Permission level.
    pub role: UserRole,
    /// Whether the email has been verified via OTP.
    pub email_verified: bool,
    /// Deactivated accounts cannot log in.
    pub is_active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The logged-in user as stored in the session.
///
/// Kept small so every request does not round-trip the full user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Permission level.
    pub role: UserRole,
}

impl CurrentUser {
    /// Build the session representation of a user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }

    /// `true` for admin accounts.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}
