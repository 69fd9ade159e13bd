//! Repository port for boards, columns, tasks and task links.
//!
//! The contract is row-level: each call creates, reads, updates or deletes
//! one row (or one link), returning a typed failure. Ordering invariants are
//! the caller's responsibility; the repository stores whatever order values
//! it is given.

use crate::board::domain::{Board, BoardId, Column, ColumnId, Task, TaskId};
use crate::identity::domain::UserId;
use crate::project::domain::{ProjectId, TagId};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for board repository operations.
pub type BoardRepositoryResult<T> = Result<T, BoardRepositoryError>;

/// Board persistence contract.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Stores a new board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::Conflict`] when the identifier exists.
    async fn store_board(&self, board: &Board) -> BoardRepositoryResult<()>;

    /// Finds a board by identifier.
    async fn find_board(&self, id: BoardId) -> BoardRepositoryResult<Option<Board>>;

    /// Returns the boards of a project ordered by creation time.
    async fn list_boards(&self, project_id: ProjectId) -> BoardRepositoryResult<Vec<Board>>;

    /// Deletes a board with its columns, tasks and task links.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] for unknown boards.
    async fn delete_board(&self, id: BoardId) -> BoardRepositoryResult<()>;

    /// Stores a new column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] when the board is unknown.
    async fn store_column(&self, column: &Column) -> BoardRepositoryResult<()>;

    /// Replaces an existing column row.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] for unknown columns.
    async fn update_column(&self, column: &Column) -> BoardRepositoryResult<()>;

    /// Finds a column by identifier.
    async fn find_column(&self, id: ColumnId) -> BoardRepositoryResult<Option<Column>>;

    /// Returns the columns of a board in any order.
    async fn list_columns(&self, board_id: BoardId) -> BoardRepositoryResult<Vec<Column>>;

    /// Deletes a column with its tasks and their links.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] for unknown columns.
    async fn delete_column(&self, id: ColumnId) -> BoardRepositoryResult<()>;

    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] when the column is unknown.
    async fn store_task(&self, task: &Task) -> BoardRepositoryResult<()>;

    /// Replaces an existing task row, including its column reference.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] for unknown tasks or an
    /// unknown target column.
    async fn update_task(&self, task: &Task) -> BoardRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>>;

    /// Returns the tasks of a column in any order.
    async fn list_tasks(&self, column_id: ColumnId) -> BoardRepositoryResult<Vec<Task>>;

    /// Deletes a task with its links.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] for unknown tasks.
    async fn delete_task(&self, id: TaskId) -> BoardRepositoryResult<()>;

    /// Links a tag to a task. Returns `false` when the link already existed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] for unknown tasks.
    async fn link_tag(&self, task_id: TaskId, tag_id: TagId) -> BoardRepositoryResult<bool>;

    /// Unlinks a tag from a task. Returns `false` when there was no link.
    async fn unlink_tag(&self, task_id: TaskId, tag_id: TagId) -> BoardRepositoryResult<bool>;

    /// Returns the tags linked to a task in link order.
    async fn task_tags(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<TagId>>;

    /// Removes every link to a tag, returning how many were removed.
    async fn unlink_tag_everywhere(&self, tag_id: TagId) -> BoardRepositoryResult<usize>;

    /// Assigns a user to a task. Returns `false` when already assigned.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::NotFound`] for unknown tasks.
    async fn link_assignee(&self, task_id: TaskId, user_id: UserId) -> BoardRepositoryResult<bool>;

    /// Removes a user from a task. Returns `false` when not assigned.
    async fn unlink_assignee(&self, task_id: TaskId, user_id: UserId)
    -> BoardRepositoryResult<bool>;

    /// Returns the users assigned to a task in assignment order.
    async fn task_assignees(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<UserId>>;
}

/// Reference to a row managed by the board repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardEntityRef {
    /// A project row, referenced by a board.
    Project(ProjectId),
    /// A board row.
    Board(BoardId),
    /// A column row.
    Column(ColumnId),
    /// A task row.
    Task(TaskId),
    /// A tag row, referenced by a task link.
    Tag(TagId),
}

impl fmt::Display for BoardEntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project {id}"),
            Self::Board(id) => write!(f, "board {id}"),
            Self::Column(id) => write!(f, "column {id}"),
            Self::Task(id) => write!(f, "task {id}"),
            Self::Tag(id) => write!(f, "tag {id}"),
        }
    }
}

/// Errors returned by board repository implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardRepositoryError {
    /// The referenced row does not exist.
    #[error("{0} not found")]
    NotFound(BoardEntityRef),

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

impl BoardRepositoryError {
    /// Wraps a transient persistence failure.
    pub fn transient(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transient(Arc::new(err))
    }
}
