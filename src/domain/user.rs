//! User domain model.

use serde::{Deserialize, Serialize};

use super::{Timestamp, define_id};

define_id!(
    /// Unique identifier for a user.
    UserId
);

/// A registered account.
///
/// The password is only ever held as an Argon2 PHC string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Login email, stored lower-cased.
    pub email: String,
    /// Argon2 PHC hash of the password.
    pub password_hash: String,
    /// Registration time.
    pub created_at: Timestamp,
}

impl User {
    /// Creates a new user record. The email is normalized to lower case.
    #[must_use]
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        email: &str,
        password_hash: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            created_at,
        }
    }
}

/// Trims and lower-cases an email address for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
