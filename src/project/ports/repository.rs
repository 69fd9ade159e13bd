//! Repository port for projects, memberships and tags.

use crate::identity::domain::{Email, UserId};
use crate::project::domain::{MemberId, Project, ProjectId, ProjectMember, Tag, TagId};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for project repository operations.
pub type ProjectRepositoryResult<T> = Result<T, ProjectRepositoryError>;

/// Project persistence contract.
///
/// Deleting a project cascades to its members and tags; boards live behind
/// the board repository and are removed by the project service.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::Conflict`] when the identifier is
    /// already taken.
    async fn store_project(&self, project: &Project) -> ProjectRepositoryResult<()>;

    /// Finds a project by identifier.
    async fn find_project(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>>;

    /// Returns the projects in which `user_id` is an accepted member.
    async fn list_projects_for_user(&self, user_id: UserId)
    -> ProjectRepositoryResult<Vec<Project>>;

    /// Deletes a project together with its members and tags.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::NotFound`] for unknown projects.
    async fn delete_project(&self, id: ProjectId) -> ProjectRepositoryResult<()>;

    /// Stores a new membership row.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::Conflict`] when the project already
    /// has a member with the same email, and
    /// [`ProjectRepositoryError::NotFound`] when the project is unknown.
    async fn store_member(&self, member: &ProjectMember) -> ProjectRepositoryResult<()>;

    /// Persists changes to an existing membership.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::NotFound`] for unknown members.
    async fn update_member(&self, member: &ProjectMember) -> ProjectRepositoryResult<()>;

    /// Finds the accepted membership of `user_id` in a project.
    async fn find_member_by_user(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> ProjectRepositoryResult<Option<ProjectMember>>;

    /// Finds a membership by invited email.
    async fn find_member_by_email(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> ProjectRepositoryResult<Option<ProjectMember>>;

    /// Returns every membership of a project, ordered by invitation time.
    async fn list_members(&self, project_id: ProjectId)
    -> ProjectRepositoryResult<Vec<ProjectMember>>;

    /// Deletes a membership.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::NotFound`] for unknown members.
    async fn delete_member(&self, id: MemberId) -> ProjectRepositoryResult<()>;

    /// Stores a new tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::Conflict`] when the project already
    /// has a tag with the same name ignoring case.
    async fn store_tag(&self, tag: &Tag) -> ProjectRepositoryResult<()>;

    /// Finds a tag by identifier.
    async fn find_tag(&self, id: TagId) -> ProjectRepositoryResult<Option<Tag>>;

    /// Returns the tags of a project ordered by name.
    async fn list_tags(&self, project_id: ProjectId) -> ProjectRepositoryResult<Vec<Tag>>;

    /// Deletes a tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::NotFound`] for unknown tags.
    async fn delete_tag(&self, id: TagId) -> ProjectRepositoryResult<()>;
}

/// Reference to a row managed by the project repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectEntityRef {
    /// A project row.
    Project(ProjectId),
    /// A membership row.
    Member(MemberId),
    /// A tag row.
    Tag(TagId),
}

impl fmt::Display for ProjectEntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project {id}"),
            Self::Member(id) => write!(f, "member {id}"),
            Self::Tag(id) => write!(f, "tag {id}"),
        }
    }
}

/// Errors returned by project repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ProjectRepositoryError {
    /// The referenced row does not exist.
    #[error("{0} not found")]
    NotFound(ProjectEntityRef),

    /// The write conflicts with existing data.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend refused the write for the current credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Network, timeout or other retryable backend failure.
    #[error("transient persistence error: {0}")]
    Transient(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProjectRepositoryError {
    /// Wraps a transient persistence failure.
    pub fn transient(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transient(Arc::new(err))
    }
}
