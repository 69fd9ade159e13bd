//! Project-scoped task tags.

use super::{ProjectDomainError, ProjectId, TagId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower-cased `#rrggbb` color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagColor(String);

impl TagColor {
    /// Creates a validated tag color.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidTagColor`] when the value is not
    /// `#` followed by six hex digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        let is_valid = normalized
            .strip_prefix('#')
            .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()));
        if !is_valid {
            return Err(ProjectDomainError::InvalidTagColor(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the color as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TagColor {
    type Error = ProjectDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagColor> for String {
    fn from(value: TagColor) -> Self {
        value.0
    }
}

impl fmt::Display for TagColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Label that can be attached to any task of its project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag identifier.
    pub id: TagId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Display name, unique per project ignoring case.
    pub name: String,
    /// Badge color.
    pub color: TagColor,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Creates a new tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyTagName`] when `name` is blank.
    pub fn new(
        project_id: ProjectId,
        name: &str,
        color: TagColor,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ProjectDomainError::EmptyTagName);
        }
        Ok(Self {
            id: TagId::new(),
            project_id,
            name: trimmed.to_owned(),
            color,
            created_at: clock.utc(),
        })
    }

    /// Case-insensitive key used for per-project uniqueness.
    #[must_use]
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }
}
