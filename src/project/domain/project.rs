//! Project aggregate root.

use super::{ProjectDomainError, ProjectId};
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Maximum project title length in characters.
const MAX_TITLE_CHARS: usize = 200;

/// A project groups boards, members and tags under one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    title: String,
    description: Option<String>,
    cover_image: Option<String>,
    owner_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted cover image reference.
    pub cover_image: Option<String>,
    /// Persisted owner.
    pub owner_id: UserId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::EmptyProjectTitle`] or
    /// [`ProjectDomainError::ProjectTitleTooLong`] for invalid titles.
    pub fn new(
        title: &str,
        description: Option<String>,
        owner_id: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ProjectDomainError::EmptyProjectTitle);
        }
        if trimmed.chars().count() > MAX_TITLE_CHARS {
            return Err(ProjectDomainError::ProjectTitleTooLong {
                max: MAX_TITLE_CHARS,
            });
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: ProjectId::new(),
            title: trimmed.to_owned(),
            description: description.filter(|text| !text.trim().is_empty()),
            cover_image: None,
            owner_id,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            cover_image: data.cover_image,
            owner_id: data.owner_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the project description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the cover image reference, if any.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.cover_image.as_deref()
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sets the cover image reference.
    pub fn set_cover_image(&mut self, cover_image: Option<String>, clock: &impl Clock) {
        self.cover_image = cover_image;
        self.updated_at = clock.utc();
    }
}
