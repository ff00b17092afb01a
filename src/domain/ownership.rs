//! Ownership checks for user-scoped records.
//!
//! Every project, tag and task belongs to exactly one user. Controllers load
//! a record by id and pass it through [`authorize`] before reading or
//! mutating it.

use thiserror::Error;

use super::{Timestamp, UserId};

/// A record scoped to the user who created it.
pub trait OwnedRecord {
    /// Human-readable record kind used in error messages.
    const KIND: &'static str;

    /// The owning user.
    fn owner(&self) -> &UserId;

    /// Creation time, used for stable listing order.
    fn created_at(&self) -> &Timestamp;

    /// Returns `true` if `user` owns this record.
    fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner() == user
    }
}

/// Why a record could not be handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No record with the requested id exists.
    #[error("{kind} not found")]
    NotFound {
        /// Record kind.
        kind: &'static str,
    },

    /// The record exists but belongs to another user.
    #[error("Not authorized to access this {kind}")]
    NotOwner {
        /// Record kind.
        kind: &'static str,
    },
}

/// Resolves a looked-up record against the requesting user.
///
/// # Errors
///
/// Returns [`AccessError::NotFound`] when `record` is `None` and
/// [`AccessError::NotOwner`] when it belongs to someone else.
pub fn authorize<T: OwnedRecord>(record: Option<T>, user: &UserId) -> Result<T, AccessError> {
    match record {
        None => Err(AccessError::NotFound { kind: T::KIND }),
        Some(record) if !record.is_owned_by(user) => Err(AccessError::NotOwner { kind: T::KIND }),
        Some(record) => Ok(record),
    }
}
