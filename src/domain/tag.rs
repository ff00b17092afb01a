//! Tag domain model.

use serde::{Deserialize, Serialize};

use super::{OwnedRecord, Timestamp, UserId, define_id};

define_id!(
    /// Unique identifier for a tag.
    TagId
);

/// Color assigned to tags created without one.
pub const DEFAULT_TAG_COLOR: &str = "blue-500";

/// A user-defined label that can be attached to many tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier for the tag.
    pub tag_id: TagId,
    /// Owning user.
    pub owner: UserId,
    /// Tag name.
    pub name: String,
    /// Palette color token, e.g. `green-500`.
    pub color: String,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Tag {
    /// Creates a new tag with the default color.
    #[must_use]
    pub fn new(tag_id: TagId, owner: UserId, name: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            tag_id,
            owner,
            name: name.into(),
            color: DEFAULT_TAG_COLOR.to_string(),
            created_at,
        }
    }

    /// Returns a new tag with the given name.
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Returns a new tag with the given color.
    #[must_use]
    pub fn with_color(self, color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            ..self
        }
    }
}

impl OwnedRecord for Tag {
    const KIND: &'static str = "Tag";

    fn owner(&self) -> &UserId {
        &self.owner
    }

    fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}
