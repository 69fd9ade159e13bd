//! The board mutation façade.
//!
//! [`BoardService`] is the only way to change the structure of a board. Each
//! operation runs in three steps:
//!
//! 1. Authorise the caller against the board's project and validate input.
//! 2. Take the critical section of every affected aggregate and hand the
//!    write sequence to a spawned task that owns it. Dropping the caller's
//!    future after this point never leaves a half-written order.
//! 3. Inside that task, read the current siblings, compute order values,
//!    write them, and update the open snapshot if it is still the one that
//!    was open when the critical section was entered.
//!
//! Failed multi-row writes are compensated before the error surfaces. The
//! service never retries.

use super::{
    config::BoardServiceConfig,
    journal::WriteJournal,
    locks::{AggregateKey, AggregateLocks},
    snapshots::Generation,
    state::BoardState,
};
use crate::board::{
    domain::{
        Board, BoardDomainError, BoardId, BoardSnapshot, Column, ColumnId, NewTask,
        OrderingError, SnapshotParts, SortOrder, Task, TaskId, TaskUpdate, Title, TitleKind,
    },
    ports::{BoardEntityRef, BoardRepository, BoardRepositoryError},
};
use crate::identity::domain::{SessionContext, UserId};
use crate::notification::{Notice, ports::Notifier};
use crate::project::{
    domain::{AuthorizationError, MemberRole, ProjectId, Tag, TagId},
    ports::{ProjectEntityRef, ProjectRepository, ProjectRepositoryError},
    services::{AccessError, Actor, authorize},
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors returned by [`BoardService`].
#[derive(Debug, Error)]
pub enum BoardServiceError {
    /// The input is invalid; nothing was written.
    #[error(transparent)]
    Validation(#[from] BoardDomainError),

    /// A referenced row does not exist.
    #[error("{0} not found")]
    NotFound(BoardEntityRef),

    /// The aggregate changed underneath the operation; refresh and retry.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller may not perform the operation.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// Transient board repository failure.
    #[error(transparent)]
    Repository(BoardRepositoryError),

    /// Transient project repository failure.
    #[error(transparent)]
    Projects(ProjectRepositoryError),

    /// The task running the critical section panicked or was aborted.
    #[error("board operation interrupted: {0}")]
    Interrupted(String),
}

impl From<OrderingError> for BoardServiceError {
    fn from(err: OrderingError) -> Self {
        Self::Validation(BoardDomainError::Ordering(err))
    }
}

impl From<BoardRepositoryError> for BoardServiceError {
    fn from(err: BoardRepositoryError) -> Self {
        match err {
            BoardRepositoryError::NotFound(entity) => Self::NotFound(entity),
            BoardRepositoryError::Conflict(message) => Self::Conflict(message),
            BoardRepositoryError::Unauthorized(message) => {
                Self::Authorization(AuthorizationError::Rejected(message))
            }
            transient @ BoardRepositoryError::Transient(_) => Self::Repository(transient),
        }
    }
}

impl From<ProjectRepositoryError> for BoardServiceError {
    fn from(err: ProjectRepositoryError) -> Self {
        match err {
            ProjectRepositoryError::NotFound(ProjectEntityRef::Project(id)) => {
                Self::NotFound(BoardEntityRef::Project(id))
            }
            ProjectRepositoryError::NotFound(ProjectEntityRef::Tag(id)) => {
                Self::NotFound(BoardEntityRef::Tag(id))
            }
            ProjectRepositoryError::Conflict(message) => Self::Conflict(message),
            ProjectRepositoryError::Unauthorized(message) => {
                Self::Authorization(AuthorizationError::Rejected(message))
            }
            other => Self::Projects(other),
        }
    }
}

impl From<AccessError> for BoardServiceError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Denied(denied) => Self::Authorization(denied),
            AccessError::Repository(repository) => repository.into(),
        }
    }
}

/// Result type for board service operations.
pub type BoardServiceResult<T> = Result<T, BoardServiceError>;

/// Mutation façade for boards, columns and tasks.
pub struct BoardService<B, P, N, C>
where
    B: BoardRepository,
    P: ProjectRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    boards: Arc<B>,
    projects: Arc<P>,
    notifier: Arc<N>,
    clock: Arc<C>,
    config: BoardServiceConfig,
    state: BoardState,
}

impl<B, P, N, C> Clone for BoardService<B, P, N, C>
where
    B: BoardRepository,
    P: ProjectRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            boards: Arc::clone(&self.boards),
            projects: Arc::clone(&self.projects),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
            config: self.config,
            state: self.state.clone(),
        }
    }
}

/// A task row paired with the version that replaces it.
type TaskRewrite = (Task, Task);

impl<B, P, N, C> BoardService<B, P, N, C>
where
    B: BoardRepository + 'static,
    P: ProjectRepository + 'static,
    N: Notifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a board service with the default configuration.
    #[must_use]
    pub fn new(boards: Arc<B>, projects: Arc<P>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            boards,
            projects,
            notifier,
            clock,
            config: BoardServiceConfig::default(),
            state: BoardState::new(),
        }
    }

    /// Shares `state` with other services that write the same rows.
    #[must_use]
    pub fn with_state(mut self, state: BoardState) -> Self {
        self.state = state;
        self
    }

    /// Returns the lock registry and open snapshots of this service.
    #[must_use]
    pub const fn state(&self) -> &BoardState {
        &self.state
    }

    /// Replaces the configuration.
    #[must_use]
    pub const fn with_config(mut self, config: BoardServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &BoardServiceConfig {
        &self.config
    }

    /// Returns the aggregate lock registry.
    #[must_use]
    pub const fn locks(&self) -> &AggregateLocks {
        self.state.locks()
    }

    // -- snapshots ---------------------------------------------------------

    /// Loads a board into an open snapshot and returns a copy of it.
    ///
    /// The rows are read while holding the board, every column of it and the
    /// project's tag set, so a snapshot never shows a half-written order.
    /// Reopening an open board replaces its snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Authorization`] for non-members,
    /// [`BoardServiceError::NotFound`] for unknown boards, and repository
    /// failures otherwise.
    pub async fn open_board(
        &self,
        ctx: &SessionContext,
        board_id: BoardId,
    ) -> BoardServiceResult<BoardSnapshot> {
        let (board, _) = self.board_scope(ctx, board_id, MemberRole::Viewer).await?;
        let project_id = board.project_id();
        loop {
            let expected = self.column_ids(board_id).await?;
            let keys: Vec<AggregateKey> = std::iter::once(AggregateKey::Board(board_id))
                .chain(expected.iter().copied().map(AggregateKey::Column))
                .chain(std::iter::once(AggregateKey::Tags(project_id)))
                .collect();
            let service = self.clone();
            let opened = self
                .run_exclusive(keys, async move { service.open_locked(board_id, expected).await })
                .await?;
            if let Some(snapshot) = opened {
                return Ok(snapshot);
            }
            debug!(%board_id, "columns changed before the board could be locked; retrying");
        }
    }

    /// Loads and opens the snapshot, or returns `None` when the board's
    /// columns are no longer `expected`.
    async fn open_locked(
        &self,
        board_id: BoardId,
        expected: Vec<ColumnId>,
    ) -> BoardServiceResult<Option<BoardSnapshot>> {
        let board = self
            .boards
            .find_board(board_id)
            .await?
            .ok_or(BoardServiceError::NotFound(BoardEntityRef::Board(board_id)))?;
        let columns = self.boards.list_columns(board_id).await?;
        let mut current: Vec<ColumnId> = columns.iter().map(Column::id).collect();
        current.sort();
        if current != expected {
            return Ok(None);
        }
        let snapshot = self.load_snapshot(board, columns).await?;
        let generation = self.state.snapshots.open(snapshot.clone()).await;
        debug!(%board_id, ?generation, "board opened");
        Ok(Some(snapshot))
    }

    /// Sorted identifiers of a board's columns.
    async fn column_ids(&self, board_id: BoardId) -> BoardServiceResult<Vec<ColumnId>> {
        let mut ids: Vec<ColumnId> = self
            .boards
            .list_columns(board_id)
            .await?
            .iter()
            .map(Column::id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Closes a board's snapshot. In-flight results for it are discarded.
    pub async fn close_board(&self, board_id: BoardId) -> bool {
        self.state.snapshots.close(board_id).await
    }

    /// Returns a copy of a board's open snapshot, if any.
    pub async fn snapshot(&self, board_id: BoardId) -> Option<BoardSnapshot> {
        self.state.snapshots.get(board_id).await
    }

    async fn load_snapshot(
        &self,
        board: Board,
        columns: Vec<Column>,
    ) -> BoardServiceResult<BoardSnapshot> {
        let mut parts = SnapshotParts {
            tags: self.projects.list_tags(board.project_id()).await?,
            ..SnapshotParts::default()
        };
        for column in &columns {
            for task in self.boards.list_tasks(column.id()).await? {
                for tag_id in self.boards.task_tags(task.id()).await? {
                    parts.tag_links.push((task.id(), tag_id));
                }
                for user_id in self.boards.task_assignees(task.id()).await? {
                    parts.assignee_links.push((task.id(), user_id));
                }
                parts.tasks.push(task);
            }
        }
        parts.columns = columns;
        Ok(BoardSnapshot::assemble(board, parts)?)
    }

    // -- boards ------------------------------------------------------------

    /// Creates a board in a project.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for an invalid title and
    /// [`BoardServiceError::Authorization`] unless the caller is at least a
    /// member.
    pub async fn create_board(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
        title: &str,
        description: Option<String>,
    ) -> BoardServiceResult<Board> {
        let result = self
            .create_board_inner(ctx, project_id, title, description)
            .await;
        self.report(&result, |board| format!("Board \"{}\" created", board.title()));
        result
    }

    async fn create_board_inner(
        &self,
        ctx: &SessionContext,
        project_id: ProjectId,
        title: &str,
        description: Option<String>,
    ) -> BoardServiceResult<Board> {
        let actor = authorize(&*self.projects, ctx, project_id, MemberRole::Member).await?;
        let validated = Title::parse(title, TitleKind::Board, self.config.max_title_chars)?;
        let board = Board::new(project_id, validated, description, &*self.clock);
        self.boards.store_board(&board).await?;
        debug!(board_id = %board.id(), %project_id, user = %actor.user_id, "board created");
        Ok(board)
    }

    /// Deletes a board with its columns and tasks, and closes its snapshot.
    /// Admins and owners only.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] for unknown boards and
    /// [`BoardServiceError::Authorization`] for callers below admin.
    pub async fn delete_board(
        &self,
        ctx: &SessionContext,
        board_id: BoardId,
    ) -> BoardServiceResult<()> {
        let result = self.delete_board_inner(ctx, board_id).await;
        self.report(&result, |()| "Board deleted".to_owned());
        result
    }

    async fn delete_board_inner(
        &self,
        ctx: &SessionContext,
        board_id: BoardId,
    ) -> BoardServiceResult<()> {
        self.board_scope(ctx, board_id, MemberRole::Admin).await?;
        let columns = self.boards.list_columns(board_id).await?;
        let keys = std::iter::once(AggregateKey::Board(board_id))
            .chain(columns.iter().map(|column| AggregateKey::Column(column.id())));
        let service = self.clone();
        self.run_exclusive(keys, async move {
            service.boards.delete_board(board_id).await?;
            service.state.snapshots.close(board_id).await;
            debug!(%board_id, "board deleted");
            Ok::<_, BoardServiceError>(())
        })
        .await
    }

    // -- columns -----------------------------------------------------------

    /// Appends a column to the end of a board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] when the title is blank,
    /// [`BoardServiceError::NotFound`] for unknown boards, and
    /// [`BoardServiceError::Authorization`] unless the caller is a member.
    pub async fn create_column(
        &self,
        ctx: &SessionContext,
        board_id: BoardId,
        title: &str,
    ) -> BoardServiceResult<Column> {
        let result = self.create_column_inner(ctx, board_id, title).await;
        self.report(&result, |column| {
            format!("Column \"{}\" created", column.title())
        });
        result
    }

    async fn create_column_inner(
        &self,
        ctx: &SessionContext,
        board_id: BoardId,
        title: &str,
    ) -> BoardServiceResult<Column> {
        self.board_scope(ctx, board_id, MemberRole::Member).await?;
        let validated = Title::parse(title, TitleKind::Column, self.config.max_title_chars)?;
        let service = self.clone();
        self.run_exclusive([AggregateKey::Board(board_id)], async move {
            service.append_column(board_id, validated).await
        })
        .await
    }

    async fn append_column(
        &self,
        board_id: BoardId,
        title: Title,
    ) -> BoardServiceResult<Column> {
        let generation = self.generation(board_id).await;
        let existing: Vec<SortOrder> = self
            .boards
            .list_columns(board_id)
            .await?
            .iter()
            .map(Column::order)
            .collect();
        let order = self.config.ordering.append_order(&existing)?;
        let column = Column::new(board_id, title, order, &*self.clock);
        self.boards.store_column(&column).await?;
        self.state
            .snapshots
            .apply_if_current(board_id, generation, |snapshot| {
                snapshot.upsert_columns(std::slice::from_ref(&column));
            })
            .await;
        debug!(%board_id, column_id = %column.id(), order = %order, "column created");
        Ok(column)
    }

    /// Renames a column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for a blank title and
    /// [`BoardServiceError::NotFound`] for unknown columns.
    pub async fn rename_column(
        &self,
        ctx: &SessionContext,
        column_id: ColumnId,
        title: &str,
    ) -> BoardServiceResult<Column> {
        let result = self.rename_column_inner(ctx, column_id, title).await;
        self.report(&result, |column| {
            format!("Column renamed to \"{}\"", column.title())
        });
        result
    }

    async fn rename_column_inner(
        &self,
        ctx: &SessionContext,
        column_id: ColumnId,
        title: &str,
    ) -> BoardServiceResult<Column> {
        let (column, _, _) = self.column_scope(ctx, column_id, MemberRole::Member).await?;
        let validated = Title::parse(title, TitleKind::Column, self.config.max_title_chars)?;
        let board_id = column.board_id();
        let service = self.clone();
        self.run_exclusive([AggregateKey::Board(board_id)], async move {
            let generation = service.generation(board_id).await;
            let mut current = service
                .boards
                .find_column(column_id)
                .await?
                .ok_or(BoardServiceError::NotFound(BoardEntityRef::Column(column_id)))?;
            current.rename(validated, &*service.clock);
            service.boards.update_column(&current).await?;
            service
                .state
                .snapshots
                .apply_if_current(board_id, generation, |snapshot| {
                    snapshot.upsert_columns(std::slice::from_ref(&current));
                })
                .await;
            debug!(%board_id, %column_id, "column renamed");
            Ok::<_, BoardServiceError>(current)
        })
        .await
    }

    /// Moves a column to `target_index` in its board's display order.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] when the column is not on
    /// `board_id`, [`BoardServiceError::Validation`] when `target_index` is
    /// out of range, and [`BoardServiceError::Conflict`] when a sibling
    /// disappeared mid-write. Partial writes are restored before returning.
    pub async fn move_column(
        &self,
        ctx: &SessionContext,
        board_id: BoardId,
        column_id: ColumnId,
        target_index: usize,
    ) -> BoardServiceResult<()> {
        let result = self
            .move_column_inner(ctx, board_id, column_id, target_index)
            .await;
        self.report(&result, |()| "Column moved".to_owned());
        result
    }

    async fn move_column_inner(
        &self,
        ctx: &SessionContext,
        board_id: BoardId,
        column_id: ColumnId,
        target_index: usize,
    ) -> BoardServiceResult<()> {
        self.board_scope(ctx, board_id, MemberRole::Member).await?;
        let service = self.clone();
        self.run_exclusive([AggregateKey::Board(board_id)], async move {
            service
                .reorder_columns(board_id, column_id, target_index)
                .await
        })
        .await
    }

    async fn reorder_columns(
        &self,
        board_id: BoardId,
        column_id: ColumnId,
        target_index: usize,
    ) -> BoardServiceResult<()> {
        let generation = self.generation(board_id).await;
        let mut columns = self.boards.list_columns(board_id).await?;
        columns.sort_by_key(Column::order);
        let from = columns
            .iter()
            .position(|column| column.id() == column_id)
            .ok_or(BoardServiceError::NotFound(BoardEntityRef::Column(column_id)))?;
        let siblings: Vec<_> = columns.iter().map(Column::as_sibling).collect();
        let assignments = self
            .config
            .ordering
            .reorder(&siblings, from, target_index)?;
        if assignments.is_empty() {
            return Ok(());
        }
        if assignments.len() > 1 {
            info!(%board_id, renumbered = assignments.len(), "renumbered board columns");
        }

        let mut journal = WriteJournal::new();
        for assignment in &assignments {
            let Some(previous) = columns.iter().find(|column| column.id() == assignment.id)
            else {
                continue;
            };
            let mut next = previous.clone();
            next.set_order(assignment.order, &*self.clock);
            if let Err(err) = journal.update_column(&*self.boards, previous, next).await {
                return Err(self.compensate(journal, err).await);
            }
        }

        let written = journal.into_columns();
        self.state
            .snapshots
            .apply_if_current(board_id, generation, |snapshot| {
                snapshot.upsert_columns(&written);
            })
            .await;
        debug!(%board_id, %column_id, target_index, "column moved");
        Ok(())
    }

    /// Deletes a column together with its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] for unknown columns.
    pub async fn delete_column(
        &self,
        ctx: &SessionContext,
        column_id: ColumnId,
    ) -> BoardServiceResult<()> {
        let result = self.delete_column_inner(ctx, column_id).await;
        self.report(&result, |()| "Column deleted".to_owned());
        result
    }

    async fn delete_column_inner(
        &self,
        ctx: &SessionContext,
        column_id: ColumnId,
    ) -> BoardServiceResult<()> {
        let (column, _, _) = self.column_scope(ctx, column_id, MemberRole::Member).await?;
        let board_id = column.board_id();
        let service = self.clone();
        let keys = [AggregateKey::Board(board_id), AggregateKey::Column(column_id)];
        self.run_exclusive(keys, async move {
            let generation = service.generation(board_id).await;
            service.boards.delete_column(column_id).await?;
            service
                .state
                .snapshots
                .apply_if_current(board_id, generation, |snapshot| {
                    snapshot.remove_column(column_id);
                })
                .await;
            debug!(%board_id, %column_id, "column deleted");
            Ok::<_, BoardServiceError>(())
        })
        .await
    }

    // -- tasks -------------------------------------------------------------

    /// Appends a task to the end of a column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] when the title is blank (the
    /// column is left unchanged) and [`BoardServiceError::NotFound`] for
    /// unknown columns.
    pub async fn create_task(
        &self,
        ctx: &SessionContext,
        column_id: ColumnId,
        input: NewTask,
    ) -> BoardServiceResult<Task> {
        let result = self.create_task_inner(ctx, column_id, input).await;
        self.report(&result, |task| format!("Task \"{}\" created", task.title()));
        result
    }

    async fn create_task_inner(
        &self,
        ctx: &SessionContext,
        column_id: ColumnId,
        input: NewTask,
    ) -> BoardServiceResult<Task> {
        let (column, _, _) = self.column_scope(ctx, column_id, MemberRole::Member).await?;
        let validated = Title::parse(input.title(), TitleKind::Task, self.config.max_title_chars)?;
        let board_id = column.board_id();
        let service = self.clone();
        self.run_exclusive([AggregateKey::Column(column_id)], async move {
            service
                .append_task(board_id, column_id, validated, input)
                .await
        })
        .await
    }

    async fn append_task(
        &self,
        board_id: BoardId,
        column_id: ColumnId,
        title: Title,
        input: NewTask,
    ) -> BoardServiceResult<Task> {
        let generation = self.generation(board_id).await;
        let existing: Vec<SortOrder> = self
            .boards
            .list_tasks(column_id)
            .await?
            .iter()
            .map(Task::position)
            .collect();
        let position = self.config.ordering.append_order(&existing)?;
        let task = Task::new(column_id, title, input, position, &*self.clock);
        self.boards.store_task(&task).await?;
        self.state
            .snapshots
            .apply_if_current(board_id, generation, |snapshot| {
                snapshot.upsert_tasks(std::slice::from_ref(&task));
            })
            .await;
        debug!(%column_id, task_id = %task.id(), position = %position, "task created");
        Ok(task)
    }

    /// Updates a task's title, description, cover image or due date.
    ///
    /// An empty update returns the task without writing.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for a blank title,
    /// [`BoardServiceError::NotFound`] for unknown tasks and
    /// [`BoardServiceError::Conflict`] when the task moved concurrently.
    pub async fn update_task(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> BoardServiceResult<Task> {
        let result = self.update_task_inner(ctx, task_id, update).await;
        self.report(&result, |task| format!("Task \"{}\" updated", task.title()));
        result
    }

    async fn update_task_inner(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> BoardServiceResult<Task> {
        let (task, column, _, _) = self.task_scope(ctx, task_id, MemberRole::Member).await?;
        let title = update
            .requested_title()
            .map(|raw| Title::parse(raw, TitleKind::Task, self.config.max_title_chars))
            .transpose()?;
        if update.is_empty() {
            return Ok(task);
        }
        let board_id = column.board_id();
        let column_id = column.id();
        let service = self.clone();
        self.run_exclusive([AggregateKey::Column(column_id)], async move {
            let generation = service.generation(board_id).await;
            let mut current = service.locked_task(task_id, column_id).await?;
            current.apply_update(title, update, &*service.clock);
            service.boards.update_task(&current).await?;
            service
                .state
                .snapshots
                .apply_if_current(board_id, generation, |snapshot| {
                    snapshot.upsert_tasks(std::slice::from_ref(&current));
                })
                .await;
            debug!(%task_id, "task updated");
            Ok::<_, BoardServiceError>(current)
        })
        .await
    }

    /// Moves a task to `target_index` in `target_column_id`, which may be the
    /// column it is already in.
    ///
    /// The move is atomic for the caller: if any write fails the rows already
    /// written are restored and the task stays where it was. Moving a task
    /// onto its current place writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] for an unknown task or target
    /// column, [`BoardServiceError::Validation`] when the target column is on
    /// another board or `target_index` is out of range, and
    /// [`BoardServiceError::Conflict`] when the column changed mid-write.
    pub async fn move_task(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        target_column_id: ColumnId,
        target_index: usize,
    ) -> BoardServiceResult<Task> {
        let result = self
            .move_task_inner(ctx, task_id, target_column_id, target_index)
            .await;
        self.report(&result, |task| format!("Task \"{}\" moved", task.title()));
        result
    }

    async fn move_task_inner(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        target_column_id: ColumnId,
        target_index: usize,
    ) -> BoardServiceResult<Task> {
        let (_, source, board, _) = self.task_scope(ctx, task_id, MemberRole::Member).await?;
        if target_column_id != source.id() {
            let target = self
                .boards
                .find_column(target_column_id)
                .await?
                .ok_or(BoardServiceError::NotFound(BoardEntityRef::Column(
                    target_column_id,
                )))?;
            if target.board_id() != board.id() {
                return Err(BoardDomainError::ForeignColumn(target_column_id).into());
            }
        }

        let board_id = board.id();
        let source_id = source.id();
        let keys = [
            AggregateKey::Column(source_id),
            AggregateKey::Column(target_column_id),
        ];
        let service = self.clone();
        self.run_exclusive(keys, async move {
            let generation = service.generation(board_id).await;
            let task = service.locked_task(task_id, source_id).await?;
            let written = if source_id == target_column_id {
                service.reorder_within(&task, target_index).await?
            } else {
                service
                    .move_across(&task, target_column_id, target_index)
                    .await?
            };
            if written.is_empty() {
                return Ok(task);
            }
            service
                .state
                .snapshots
                .apply_if_current(board_id, generation, |snapshot| {
                    snapshot.upsert_tasks(&written);
                })
                .await;
            debug!(
                %task_id,
                from = %source_id,
                to = %target_column_id,
                target_index,
                "task moved"
            );
            let moved = written
                .into_iter()
                .find(|row| row.id() == task_id)
                .unwrap_or(task);
            Ok::<_, BoardServiceError>(moved)
        })
        .await
    }

    async fn reorder_within(
        &self,
        task: &Task,
        target_index: usize,
    ) -> BoardServiceResult<Vec<Task>> {
        let column_id = task.column_id();
        let siblings = self.sorted_tasks(column_id).await?;
        let from = siblings
            .iter()
            .position(|row| row.id() == task.id())
            .ok_or(BoardServiceError::NotFound(BoardEntityRef::Task(task.id())))?;
        let entries: Vec<_> = siblings.iter().map(Task::as_sibling).collect();
        let assignments = self.config.ordering.reorder(&entries, from, target_index)?;
        if assignments.len() > 1 {
            info!(%column_id, renumbered = assignments.len(), "renumbered column tasks");
        }
        let rewrites = assignments
            .iter()
            .filter_map(|assignment| {
                let previous = siblings.iter().find(|row| row.id() == assignment.id)?;
                let mut next = previous.clone();
                next.relocate(column_id, assignment.order, &*self.clock);
                Some((previous.clone(), next))
            })
            .collect();
        self.commit_tasks(rewrites).await
    }

    async fn move_across(
        &self,
        task: &Task,
        target_id: ColumnId,
        target_index: usize,
    ) -> BoardServiceResult<Vec<Task>> {
        if self.boards.find_column(target_id).await?.is_none() {
            return Err(BoardServiceError::NotFound(BoardEntityRef::Column(target_id)));
        }
        let siblings = self.sorted_tasks(target_id).await?;
        let entries: Vec<_> = siblings.iter().map(Task::as_sibling).collect();
        let placement = self.config.ordering.insert_at(&entries, target_index)?;
        if placement.is_renumbered() {
            info!(
                column_id = %target_id,
                renumbered = placement.renumbered.len(),
                "renumbered column tasks"
            );
        }

        let mut rewrites: Vec<TaskRewrite> = placement
            .renumbered
            .iter()
            .filter_map(|assignment| {
                let previous = siblings.iter().find(|row| row.id() == assignment.id)?;
                let mut next = previous.clone();
                next.relocate(target_id, assignment.order, &*self.clock);
                Some((previous.clone(), next))
            })
            .collect();
        let mut moved = task.clone();
        moved.relocate(target_id, placement.order, &*self.clock);
        rewrites.push((task.clone(), moved));
        self.commit_tasks(rewrites).await
    }

    async fn commit_tasks(&self, rewrites: Vec<TaskRewrite>) -> BoardServiceResult<Vec<Task>> {
        let mut journal = WriteJournal::new();
        for (previous, next) in rewrites {
            if let Err(err) = journal.update_task(&*self.boards, &previous, next).await {
                return Err(self.compensate(journal, err).await);
            }
        }
        Ok(journal.into_tasks())
    }

    async fn sorted_tasks(&self, column_id: ColumnId) -> BoardServiceResult<Vec<Task>> {
        let mut tasks = self.boards.list_tasks(column_id).await?;
        tasks.sort_by_key(Task::position);
        Ok(tasks)
    }

    /// Re-reads a task inside the critical section of `column_id`.
    async fn locked_task(&self, task_id: TaskId, column_id: ColumnId) -> BoardServiceResult<Task> {
        let task = self
            .boards
            .find_task(task_id)
            .await?
            .ok_or(BoardServiceError::NotFound(BoardEntityRef::Task(task_id)))?;
        if task.column_id() != column_id {
            return Err(BoardServiceError::Conflict(format!(
                "task {task_id} left column {column_id} while waiting for it"
            )));
        }
        Ok(task)
    }

    /// Deletes a task with its tag and assignee links.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] for unknown tasks.
    pub async fn delete_task(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
    ) -> BoardServiceResult<()> {
        let result = self.delete_task_inner(ctx, task_id).await;
        self.report(&result, |()| "Task deleted".to_owned());
        result
    }

    async fn delete_task_inner(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
    ) -> BoardServiceResult<()> {
        let (_, column, _, _) = self.task_scope(ctx, task_id, MemberRole::Member).await?;
        let board_id = column.board_id();
        let service = self.clone();
        self.run_exclusive([AggregateKey::Column(column.id())], async move {
            let generation = service.generation(board_id).await;
            service.boards.delete_task(task_id).await?;
            service
                .state
                .snapshots
                .apply_if_current(board_id, generation, |snapshot| {
                    snapshot.remove_task(task_id);
                })
                .await;
            debug!(%task_id, "task deleted");
            Ok::<_, BoardServiceError>(())
        })
        .await
    }

    // -- links -------------------------------------------------------------

    /// Links a project tag to a task. Returns `false` when it was already
    /// linked.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] for unknown tasks or tags and
    /// [`BoardServiceError::Validation`] when the tag belongs to another
    /// project.
    pub async fn assign_tag(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        tag_id: TagId,
    ) -> BoardServiceResult<bool> {
        let result = self.assign_tag_inner(ctx, task_id, tag_id).await;
        self.report(&result, |_| "Tag added".to_owned());
        result
    }

    async fn assign_tag_inner(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        tag_id: TagId,
    ) -> BoardServiceResult<bool> {
        let (_, column, board, _) = self.task_scope(ctx, task_id, MemberRole::Member).await?;
        let project_id = board.project_id();
        self.project_tag(project_id, tag_id).await?;
        let board_id = board.id();
        let keys = [
            AggregateKey::Column(column.id()),
            AggregateKey::Tags(project_id),
        ];
        let service = self.clone();
        self.run_exclusive(keys, async move {
            let generation = service.generation(board_id).await;
            let tag = service.project_tag(project_id, tag_id).await?;
            let linked = service.boards.link_tag(task_id, tag_id).await?;
            service
                .state
                .snapshots
                .apply_if_current(board_id, generation, |snapshot| {
                    snapshot.link_tag(task_id, &tag);
                })
                .await;
            debug!(%task_id, %tag_id, linked, "tag assigned");
            Ok::<_, BoardServiceError>(linked)
        })
        .await
    }

    /// Unlinks a tag from a task. Returns `false` when it was not linked.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] for unknown tasks.
    pub async fn unassign_tag(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        tag_id: TagId,
    ) -> BoardServiceResult<bool> {
        let result = self.unassign_tag_inner(ctx, task_id, tag_id).await;
        self.report(&result, |_| "Tag removed".to_owned());
        result
    }

    async fn unassign_tag_inner(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        tag_id: TagId,
    ) -> BoardServiceResult<bool> {
        let (_, column, board, _) = self.task_scope(ctx, task_id, MemberRole::Member).await?;
        let board_id = board.id();
        let service = self.clone();
        self.run_exclusive([AggregateKey::Column(column.id())], async move {
            let generation = service.generation(board_id).await;
            let unlinked = service.boards.unlink_tag(task_id, tag_id).await?;
            service
                .state
                .snapshots
                .apply_if_current(board_id, generation, |snapshot| {
                    snapshot.unlink_tag(task_id, tag_id);
                })
                .await;
            debug!(%task_id, %tag_id, unlinked, "tag unassigned");
            Ok::<_, BoardServiceError>(unlinked)
        })
        .await
    }

    /// Assigns a project member to a task. Returns `false` when already
    /// assigned.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] when the user is not an
    /// accepted member of the board's project.
    pub async fn assign_user(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        user_id: UserId,
    ) -> BoardServiceResult<bool> {
        let result = self.assign_user_inner(ctx, task_id, user_id).await;
        self.report(&result, |_| "Assignee added".to_owned());
        result
    }

    async fn assign_user_inner(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        user_id: UserId,
    ) -> BoardServiceResult<bool> {
        let (_, column, board, _) = self.task_scope(ctx, task_id, MemberRole::Member).await?;
        if self
            .projects
            .find_member_by_user(board.project_id(), user_id)
            .await?
            .is_none()
        {
            return Err(BoardDomainError::NonMemberAssignee(user_id).into());
        }
        let board_id = board.id();
        let service = self.clone();
        self.run_exclusive([AggregateKey::Column(column.id())], async move {
            let generation = service.generation(board_id).await;
            let linked = service.boards.link_assignee(task_id, user_id).await?;
            service
                .state
                .snapshots
                .apply_if_current(board_id, generation, |snapshot| {
                    snapshot.link_assignee(task_id, user_id);
                })
                .await;
            debug!(%task_id, %user_id, linked, "user assigned");
            Ok::<_, BoardServiceError>(linked)
        })
        .await
    }

    /// Removes a user from a task. Returns `false` when not assigned.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] for unknown tasks.
    pub async fn unassign_user(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        user_id: UserId,
    ) -> BoardServiceResult<bool> {
        let result = self.unassign_user_inner(ctx, task_id, user_id).await;
        self.report(&result, |_| "Assignee removed".to_owned());
        result
    }

    async fn unassign_user_inner(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        user_id: UserId,
    ) -> BoardServiceResult<bool> {
        let (_, column, board, _) = self.task_scope(ctx, task_id, MemberRole::Member).await?;
        let board_id = board.id();
        let service = self.clone();
        self.run_exclusive([AggregateKey::Column(column.id())], async move {
            let generation = service.generation(board_id).await;
            let unlinked = service.boards.unlink_assignee(task_id, user_id).await?;
            service
                .state
                .snapshots
                .apply_if_current(board_id, generation, |snapshot| {
                    snapshot.unlink_assignee(task_id, user_id);
                })
                .await;
            debug!(%task_id, %user_id, unlinked, "user unassigned");
            Ok::<_, BoardServiceError>(unlinked)
        })
        .await
    }

    // -- plumbing ----------------------------------------------------------

    async fn run_exclusive<T, I, F>(&self, keys: I, work: F) -> BoardServiceResult<T>
    where
        I: IntoIterator<Item = AggregateKey>,
        F: Future<Output = BoardServiceResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        match self.state.run_exclusive(keys, work).await {
            Ok(outcome) => outcome,
            Err(err) => Err(BoardServiceError::Interrupted(err.to_string())),
        }
    }

    /// Generation of the open snapshot, read inside a critical section.
    async fn generation(&self, board_id: BoardId) -> Option<Generation> {
        self.state.snapshots.generation(board_id).await
    }

    /// Looks up a tag and checks it belongs to `project_id`.
    async fn project_tag(&self, project_id: ProjectId, tag_id: TagId) -> BoardServiceResult<Tag> {
        let tag = self
            .projects
            .find_tag(tag_id)
            .await?
            .ok_or(BoardServiceError::NotFound(BoardEntityRef::Tag(tag_id)))?;
        if tag.project_id != project_id {
            return Err(BoardDomainError::ForeignTag(tag_id).into());
        }
        Ok(tag)
    }

    /// Restores journalled rows and turns the write failure into the error
    /// reported to the caller.
    async fn compensate(
        &self,
        journal: WriteJournal,
        err: BoardRepositoryError,
    ) -> BoardServiceError {
        let failures = journal.rollback(&*self.boards).await;
        if failures > 0 {
            warn!(failures, error = %err, "rollback left rows unrestored");
        }
        match err {
            BoardRepositoryError::NotFound(entity) => BoardServiceError::Conflict(format!(
                "{entity} disappeared while the order was being written"
            )),
            other => other.into(),
        }
    }

    async fn board_scope(
        &self,
        ctx: &SessionContext,
        board_id: BoardId,
        required: MemberRole,
    ) -> BoardServiceResult<(Board, Actor)> {
        ctx.session().ok_or(AuthorizationError::MissingSession)?;
        let board = self
            .boards
            .find_board(board_id)
            .await?
            .ok_or(BoardServiceError::NotFound(BoardEntityRef::Board(board_id)))?;
        let actor = authorize(&*self.projects, ctx, board.project_id(), required).await?;
        Ok((board, actor))
    }

    async fn column_scope(
        &self,
        ctx: &SessionContext,
        column_id: ColumnId,
        required: MemberRole,
    ) -> BoardServiceResult<(Column, Board, Actor)> {
        ctx.session().ok_or(AuthorizationError::MissingSession)?;
        let column = self
            .boards
            .find_column(column_id)
            .await?
            .ok_or(BoardServiceError::NotFound(BoardEntityRef::Column(column_id)))?;
        let (board, actor) = self.board_scope(ctx, column.board_id(), required).await?;
        Ok((column, board, actor))
    }

    async fn task_scope(
        &self,
        ctx: &SessionContext,
        task_id: TaskId,
        required: MemberRole,
    ) -> BoardServiceResult<(Task, Column, Board, Actor)> {
        ctx.session().ok_or(AuthorizationError::MissingSession)?;
        let task = self
            .boards
            .find_task(task_id)
            .await?
            .ok_or(BoardServiceError::NotFound(BoardEntityRef::Task(task_id)))?;
        let (column, board, actor) = self.column_scope(ctx, task.column_id(), required).await?;
        Ok((task, column, board, actor))
    }

    fn report<T>(&self, result: &BoardServiceResult<T>, success: impl FnOnce(&T) -> String) {
        let notice = match result {
            Ok(value) => Notice::success(success(value)),
            Err(err) => Notice::error(err.to_string()),
        };
        self.notifier.notify(notice);
    }
}
