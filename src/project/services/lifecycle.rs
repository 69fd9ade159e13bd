//! Service layer for project, membership and tag management.

use crate::board::{
    ports::{BoardEntityRef, BoardRepository, BoardRepositoryError},
    services::{AggregateKey, BoardState},
};
use crate::identity::domain::{Email, IdentityDomainError, SessionContext};
use crate::notification::{Notice, ports::Notifier};
use crate::project::{
    domain::{
        AuthorizationError, MemberId, MemberRole, Project, ProjectDomainError, ProjectId,
        ProjectMember, Tag, TagColor, TagId,
    },
    ports::{ProjectEntityRef, ProjectRepository, ProjectRepositoryError},
    services::access::{AccessError, Actor, authorize},
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Service-level errors for project operations.
#[derive(Debug, Error)]
pub enum ProjectServiceError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ProjectDomainError),
    /// The email address is malformed.
    #[error(transparent)]
    InvalidEmail(#[from] IdentityDomainError),
    /// The referenced row no longer exists.
    #[error("{0} not found")]
    NotFound(ProjectEntityRef),
    /// The write conflicts with existing data.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The caller may not perform the operation.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    /// Transient project repository failure.
    #[error(transparent)]
    Repository(ProjectRepositoryError),
    /// Transient board repository failure during a cascade.
    #[error(transparent)]
    Boards(BoardRepositoryError),
    /// The task running the critical section panicked or was aborted.
    #[error("project operation interrupted: {0}")]
    Interrupted(String),
}

impl From<ProjectRepositoryError> for ProjectServiceError {
    fn from(err: ProjectRepositoryError) -> Self {
        match err {
            ProjectRepositoryError::NotFound(entity) => Self::NotFound(entity),
            ProjectRepositoryError::Conflict(message) => Self::Conflict(message),
            ProjectRepositoryError::Unauthorized(message) => {
                Self::Authorization(AuthorizationError::Rejected(message))
            }
            transient @ ProjectRepositoryError::Transient(_) => Self::Repository(transient),
        }
    }
}

impl From<BoardRepositoryError> for ProjectServiceError {
    fn from(err: BoardRepositoryError) -> Self {
        match err {
            BoardRepositoryError::NotFound(entity) => {
                Self::Conflict(format!("{entity} disappeared during the operation"))
            }
            BoardRepositoryError::Conflict(message) => Self::Conflict(message),
            BoardRepositoryError::Unauthorized(message) => {
                Self::Authorization(AuthorizationError::Rejected(message))
            }
            transient @ BoardRepositoryError::Transient(_) => Self::Boards(transient),
        }
    }
}

impl From<AccessError> for ProjectServiceError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Denied(denied) => Self::Authorization(denied),
            AccessError::Repository(repository) => repository.into(),
        }
    }
}

/// Result type for project service operations.
pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// A project together with its memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOverview {
    /// The project record.
    pub project: Project,
    /// Every membership, accepted or pending.
    pub members: Vec<ProjectMember>,
}

/// Project management service.
///
/// Deleting projects and tags rewrites board rows, so the service must share
/// the [`BoardState`] of the board service in front of the same rows; see
/// [`ProjectService::with_board_state`].
pub struct ProjectService<P, B, N, C>
where
    P: ProjectRepository,
    B: BoardRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    projects: Arc<P>,
    boards: Arc<B>,
    notifier: Arc<N>,
    clock: Arc<C>,
    board_state: BoardState,
}

impl<P, B, N, C> Clone for ProjectService<P, B, N, C>
where
    P: ProjectRepository,
    B: BoardRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            projects: Arc::clone(&self.projects),
            boards: Arc::clone(&self.boards),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
            board_state: self.board_state.clone(),
        }
    }
}

impl<P, B, N, C> ProjectService<P, B, N, C>
where
    P: ProjectRepository + 'static,
    B: BoardRepository + 'static,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates a new project service with a board state of its own.
    #[must_use]
    pub fn new(projects: Arc<P>, boards: Arc<B>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            projects,
            boards,
            notifier,
            clock,
            board_state: BoardState::new(),
        }
    }

    /// Shares the lock registry and open snapshots of a board service.
    #[must_use]
    pub fn with_board_state(mut self, state: BoardState) -> Self {
        self.board_state = state;
        self
    }

    /// Creates a project owned by the signed-in user, together with the
    /// owner's accepted membership.
    ///
    /// If the membership cannot be stored the project row is removed again.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Authorization`] without a session,
    /// [`ProjectServiceError::Validation`] for an invalid title, and
    /// repository failures otherwise.
    pub async fn create_project(
        &self,
        ctx: &SessionContext,
        title: &str,
        description: Option<String>,
    ) -> ProjectServiceResult<Project> {
        let result = self.create_project_inner(ctx, title, description).await;
        self.report(&result, |project| {
            format!("Project \"{}\" created", project.title())
        });
        result
    }

    async fn create_project_inner(
        &self,
        ctx: &SessionContext,
        title: &str,
        description: Option<String>,
    ) -> ProjectServiceResult<Project> {
        let session = ctx.session().ok_or(AuthorizationError::MissingSession)?;
        let project = Project::new(title, description, session.user_id(), &*self.clock)?;
        self.projects.store_project(&project).await?;

        let owner = ProjectMember::owner(
            project.id(),
            session.user_id(),
            session.email().clone(),
            &*self.clock,
        );
        if let Err(err) = self.projects.store_member(&owner).await {
            if let Err(rollback) = self.projects.delete_project(project.id()).await {
                warn!(
                    project_id = %project.id(),
                    error = %rollback,
                    "failed to remove project after owner membership write failed"
                );
            }
            return Err(err.into());
        }

        debug!(project_id = %project.id(), owner = %session.user_id(), "project created");
        Ok(project)
    }

    /// Lists the projects the signed-in user has joined, with members.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Authorization`] without a session. Any
    /// repository failure is returned as an error, never as an empty list.
    pub async fn list_projects(
        &self,
        ctx: &SessionContext,
    ) -> ProjectServiceResult<Vec<ProjectOverview>> {
        let session = ctx.session().ok_or(AuthorizationError::MissingSession)?;
        let projects = self
            .projects
            .list_projects_for_user(session.user_id())
            .await?;
        let mut overviews = Vec::with_capacity(projects.len());
        for project in projects {
            let members = self.projects.list_members(project.id()).await?;
            overviews.push(ProjectOverview { project, members });
        }
        Ok(overviews)
    }

    /// Deletes a project with its boards, members and tags, and closes the
    /// boards' open snapshots. Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Authorization`] for non-owners,
    /// [`ProjectServiceError::NotFound`] for unknown projects, and repository
    /// failures otherwise.
    pub async fn delete_project(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
    ) -> ProjectServiceResult<()> {
        let result = self.delete_project_inner(ctx, project_id).await;
        self.report(&result, |()| "Project deleted".to_owned());
        result
    }

    async fn delete_project_inner(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
    ) -> ProjectServiceResult<()> {
        self.authorize(ctx, project_id, MemberRole::Owner).await?;

        let boards = self.boards.list_boards(project_id).await?;
        let mut keys = vec![AggregateKey::Tags(project_id)];
        for board in &boards {
            keys.push(AggregateKey::Board(board.id()));
            let columns = self.boards.list_columns(board.id()).await?;
            keys.extend(columns.iter().map(|column| AggregateKey::Column(column.id())));
        }

        let board_rows = Arc::clone(&self.boards);
        let project_rows = Arc::clone(&self.projects);
        let snapshots = self.board_state.snapshots().clone();
        let work = async move {
            for board in boards {
                match board_rows.delete_board(board.id()).await {
                    Ok(()) | Err(BoardRepositoryError::NotFound(BoardEntityRef::Board(_))) => {}
                    Err(err) => return Err(ProjectServiceError::from(err)),
                }
                snapshots.close(board.id()).await;
            }
            project_rows.delete_project(project_id).await?;
            debug!(%project_id, "project deleted");
            Ok::<_, ProjectServiceError>(())
        };
        self.run_exclusive(keys, work).await
    }

    /// Returns a project's memberships. Any member may read them.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Authorization`] for non-members and
    /// repository failures otherwise.
    pub async fn list_members(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
    ) -> ProjectServiceResult<Vec<ProjectMember>> {
        self.authorize(ctx, project_id, MemberRole::Viewer).await?;
        Ok(self.projects.list_members(project_id).await?)
    }

    /// Invites `email` to the project with `role`. Admins and owners only.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::InvalidEmail`] for malformed addresses,
    /// [`ProjectServiceError::Validation`] when inviting an owner,
    /// [`ProjectServiceError::Conflict`] when the address is already a
    /// member, and [`ProjectServiceError::Authorization`] for callers below
    /// admin.
    pub async fn invite_member(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
        email: &str,
        role: MemberRole,
    ) -> ProjectServiceResult<ProjectMember> {
        let result = self.invite_member_inner(ctx, project_id, email, role).await;
        self.report(&result, |member| {
            format!("An invitation was sent to {}", member.email())
        });
        result
    }

    async fn invite_member_inner(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
        email: &str,
        role: MemberRole,
    ) -> ProjectServiceResult<ProjectMember> {
        let email = Email::new(email)?;
        self.authorize(ctx, project_id, MemberRole::Admin).await?;
        let member = ProjectMember::invite(project_id, email, role, &*self.clock)?;
        self.projects.store_member(&member).await?;
        debug!(%project_id, member_id = %member.id(), role = %role, "member invited");
        Ok(member)
    }

    /// Accepts the pending invitation addressed to the signed-in user's email.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Authorization`] without a session or
    /// when no invitation matches the session email, and
    /// [`ProjectServiceError::Validation`] when it was already accepted.
    pub async fn accept_invitation(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
    ) -> ProjectServiceResult<ProjectMember> {
        let result = self.accept_invitation_inner(ctx, project_id).await;
        self.report(&result, |_| "Invitation accepted".to_owned());
        result
    }

    async fn accept_invitation_inner(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
    ) -> ProjectServiceResult<ProjectMember> {
        let session = ctx.session().ok_or(AuthorizationError::MissingSession)?;
        let mut member = self
            .projects
            .find_member_by_email(project_id, session.email())
            .await?
            .ok_or(AuthorizationError::NotMember(project_id))?;
        member.accept(session.user_id())?;
        self.projects.update_member(&member).await?;
        debug!(%project_id, member_id = %member.id(), "invitation accepted");
        Ok(member)
    }

    /// Removes a membership. Admins and owners only; the owner stays.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`] when the member is not part
    /// of the project and [`ProjectServiceError::Validation`] when targeting
    /// the owner.
    pub async fn revoke_member(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
        member_id: MemberId,
    ) -> ProjectServiceResult<()> {
        let result = self.revoke_member_inner(ctx, project_id, member_id).await;
        self.report(&result, |()| "Member removed".to_owned());
        result
    }

    async fn revoke_member_inner(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
        member_id: MemberId,
    ) -> ProjectServiceResult<()> {
        self.authorize(ctx, project_id, MemberRole::Admin).await?;
        let member = self
            .projects
            .list_members(project_id)
            .await?
            .into_iter()
            .find(|member| member.id() == member_id)
            .ok_or(ProjectServiceError::NotFound(ProjectEntityRef::Member(
                member_id,
            )))?;
        if member.role() == MemberRole::Owner {
            return Err(ProjectDomainError::OwnerCannotBeRevoked.into());
        }
        self.projects.delete_member(member_id).await?;
        debug!(%project_id, %member_id, "member revoked");
        Ok(())
    }

    /// Creates a tag. Admins and owners only.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Validation`] for a blank name or bad
    /// color and [`ProjectServiceError::Conflict`] when the project already
    /// has a tag with that name.
    pub async fn create_tag(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
        name: &str,
        color: &str,
    ) -> ProjectServiceResult<Tag> {
        let result = self.create_tag_inner(ctx, project_id, name, color).await;
        self.report(&result, |tag| format!("Tag \"{}\" created", tag.name));
        result
    }

    async fn create_tag_inner(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
        name: &str,
        color: &str,
    ) -> ProjectServiceResult<Tag> {
        let parsed = TagColor::new(color)?;
        self.authorize(ctx, project_id, MemberRole::Admin).await?;
        let tag = Tag::new(project_id, name, parsed, &*self.clock)?;
        self.projects.store_tag(&tag).await?;
        debug!(%project_id, tag_id = %tag.id, "tag created");
        Ok(tag)
    }

    /// Deletes a tag and every task link to it, and drops it from the open
    /// snapshots of the project's boards. Admins and owners only.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`] for unknown tags.
    pub async fn delete_tag(
        &self,
        ctx: &SessionContext,
        tag_id: TagId,
    ) -> ProjectServiceResult<()> {
        let result = self.delete_tag_inner(ctx, tag_id).await;
        self.report(&result, |()| "Tag deleted".to_owned());
        result
    }

    async fn delete_tag_inner(
        &self,
        ctx: &SessionContext,
        tag_id: TagId,
    ) -> ProjectServiceResult<()> {
        let tag = self
            .projects
            .find_tag(tag_id)
            .await?
            .ok_or(ProjectServiceError::NotFound(ProjectEntityRef::Tag(tag_id)))?;
        let project_id = tag.project_id;
        self.authorize(ctx, project_id, MemberRole::Admin).await?;

        let board_rows = Arc::clone(&self.boards);
        let project_rows = Arc::clone(&self.projects);
        let snapshots = self.board_state.snapshots().clone();
        let work = async move {
            let unlinked = board_rows.unlink_tag_everywhere(tag_id).await?;
            project_rows.delete_tag(tag_id).await?;
            for board in board_rows.list_boards(project_id).await? {
                snapshots
                    .update_open(board.id(), |snapshot| snapshot.remove_tag(tag_id))
                    .await;
            }
            debug!(%tag_id, unlinked, "tag deleted");
            Ok::<_, ProjectServiceError>(())
        };
        self.run_exclusive([AggregateKey::Tags(project_id)], work).await
    }

    /// Lists a project's tags ordered by name. Any member may read them.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Authorization`] for non-members.
    pub async fn list_tags(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
    ) -> ProjectServiceResult<Vec<Tag>> {
        self.authorize(ctx, project_id, MemberRole::Viewer).await?;
        Ok(self.projects.list_tags(project_id).await?)
    }

    async fn authorize(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
        required: MemberRole,
    ) -> ProjectServiceResult<Actor> {
        Ok(authorize(&*self.projects, ctx, project_id, required).await?)
    }

    async fn run_exclusive<T, I, F>(&self, keys: I, work: F) -> ProjectServiceResult<T>
    where
        I: IntoIterator<Item = AggregateKey>,
        F: Future<Output = ProjectServiceResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        match self.board_state.run_exclusive(keys, work).await {
            Ok(outcome) => outcome,
            Err(err) => Err(ProjectServiceError::Interrupted(err.to_string())),
        }
    }

    fn report<T>(&self, result: &ProjectServiceResult<T>, success: impl FnOnce(&T) -> String) {
        let notice = match result {
            Ok(value) => Notice::success(success(value)),
            Err(err) => Notice::error(err.to_string()),
        };
        self.notifier.notify(notice);
    }
}
