//! Role checks shared by every service that mutates project data.

use crate::identity::domain::{SessionContext, UserId};
use crate::project::{
    domain::{AuthorizationError, MemberRole, Project, ProjectId},
    ports::{ProjectEntityRef, ProjectRepository, ProjectRepositoryError},
};
use thiserror::Error;

/// An authorised caller together with the project they act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Acting user.
    pub user_id: UserId,
    /// Effective role; administrators act as owners.
    pub role: MemberRole,
    /// Project the role applies to.
    pub project: Project,
}

/// Errors returned by [`authorize`].
#[derive(Debug, Clone, Error)]
pub enum AccessError {
    /// The caller may not perform the operation.
    #[error(transparent)]
    Denied(#[from] AuthorizationError),

    /// Loading the project or membership failed.
    #[error(transparent)]
    Repository(#[from] ProjectRepositoryError),
}

/// Checks that the caller holds at least `required` in `project_id`.
///
/// A missing session is an authorization failure, never a validation one.
/// Profiles flagged as administrators pass every check.
///
/// # Errors
///
/// Returns [`AccessError::Denied`] when the session is missing, the user is
/// not an accepted member, or the role is too low, and
/// [`AccessError::Repository`] when the project does not exist or lookups
/// fail.
pub async fn authorize<P>(
    projects: &P,
    ctx: &SessionContext,
    project_id: ProjectId,
    required: MemberRole,
) -> Result<Actor, AccessError>
where
    P: ProjectRepository + ?Sized,
{
    let session = ctx.session().ok_or(AuthorizationError::MissingSession)?;
    let project = projects
        .find_project(project_id)
        .await?
        .ok_or(ProjectRepositoryError::NotFound(ProjectEntityRef::Project(
            project_id,
        )))?;

    if ctx.is_admin() {
        return Ok(Actor {
            user_id: session.user_id(),
            role: MemberRole::Owner,
            project,
        });
    }

    let member = projects
        .find_member_by_user(project_id, session.user_id())
        .await?
        .ok_or(AuthorizationError::NotMember(project_id))?;
    if !member.role().permits(required) {
        return Err(AuthorizationError::InsufficientRole {
            required,
            actual: member.role(),
        }
        .into());
    }

    Ok(Actor {
        user_id: session.user_id(),
        role: member.role(),
        project,
    })
}
