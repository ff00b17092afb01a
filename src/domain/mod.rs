//! Domain module for task management.
//!
//! This module contains the domain records (users, projects, tags, tasks),
//! their identifiers, and the ownership rules every controller applies.

pub mod ownership;
pub mod project;
pub mod tag;
pub mod task;
pub mod user;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use ownership::{AccessError, OwnedRecord, authorize};
pub use project::{Project, ProjectId};
pub use tag::{DEFAULT_TAG_COLOR, Tag, TagId};
pub use task::{ChecklistItem, ChecklistItemId, Task, TaskId, TaskStatus};
pub use user::{User, UserId};

// =============================================================================
// Identifiers
// =============================================================================

/// Declares a UUID newtype identifier.
///
/// Identifiers serialize as the bare UUID string, so they can be stored
/// inside JSON documents and compared with `->>` in SQL.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }

            /// Generates a new time-ordered identifier (UUID v7).
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// Parses an identifier from its hyphenated string form.
            ///
            /// # Errors
            ///
            /// Returns the `uuid` parse error for malformed input.
            pub fn parse(value: &str) -> Result<Self, uuid::Error> {
                uuid::Uuid::parse_str(value.trim()).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

pub(crate) use define_id;

// =============================================================================
// Timestamp
// =============================================================================

/// A timestamp wrapper for `DateTime<Utc>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parses either an RFC 3339 datetime or a bare `YYYY-MM-DD` date.
    ///
    /// Bare dates resolve to midnight UTC, which is what date pickers send.
    #[must_use]
    pub fn parse_flexible(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
            return Some(Self(datetime.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self(naive.and_utc()))
    }

    /// Formats the timestamp as RFC 3339 with millisecond precision.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.to_rfc3339())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_timestamp_parse_flexible_accepts_rfc3339() {
        let parsed = Timestamp::parse_flexible("2024-05-01T10:30:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T08:30:00.000Z");
    }

    #[rstest]
    fn test_timestamp_parse_flexible_accepts_bare_date() {
        let parsed = Timestamp::parse_flexible("2024-05-01").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T00:00:00.000Z");
    }

    #[rstest]
    #[case("")]
    #[case("tomorrow")]
    #[case("2024-13-01")]
    fn test_timestamp_parse_flexible_rejects_garbage(#[case] input: &str) {
        assert!(Timestamp::parse_flexible(input).is_none());
    }

    #[rstest]
    fn test_id_parse_round_trips_display() {
        let id = TaskId::generate();
        let parsed = TaskId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[rstest]
    fn test_id_parse_rejects_malformed() {
        assert!(ProjectId::parse("not-a-uuid").is_err());
    }

    #[rstest]
    fn test_id_serializes_as_bare_string() {
        let uuid = uuid::Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let id = TagId::from_uuid(uuid);
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"550e8400-e29b-41d4-a716-446655440000\""
        );
    }
}
