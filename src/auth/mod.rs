//! Bearer-token authentication.
//!
//! Passwords are stored as Argon2id PHC strings ([`password`]). Sessions are
//! HS256-signed compact tokens carrying the user id ([`token`]). The
//! [`CurrentUser`] extractor guards every resource route.

pub mod extractor;
pub mod password;
pub mod token;

use thiserror::Error;

pub use extractor::CurrentUser;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

/// Reasons a request or credential is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header, or an empty token.
    #[error("No token provided")]
    MissingCredentials,

    /// The header does not use the `Bearer` scheme.
    #[error("Authorization header must use the Bearer scheme")]
    InvalidScheme,

    /// The token is not a well-formed HS256 token.
    #[error("Malformed token")]
    MalformedToken,

    /// The signature does not match.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// The token is past its expiry.
    #[error("Token has expired")]
    Expired,

    /// The token names a user that no longer exists.
    #[error("User no longer exists")]
    UnknownUser,

    /// Hashing or signing failed for reasons unrelated to the caller.
    #[error("Credential processing failed: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns `true` when the failure is the caller's fault (401), as
    /// opposed to a server-side fault (500).
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}
