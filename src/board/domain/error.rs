//! Error types for board domain validation and order computation.

use super::{ColumnId, TaskId};
use crate::identity::domain::UserId;
use crate::project::domain::TagId;
use std::fmt;
use thiserror::Error;

/// Entity a title belongs to, used in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TitleKind {
    /// Board title.
    Board,
    /// Column title.
    Column,
    /// Task title.
    Task,
}

impl fmt::Display for TitleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Board => "board",
            Self::Column => "column",
            Self::Task => "task",
        })
    }
}

/// Errors returned while validating board input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The title is empty after trimming.
    #[error("{0} title must not be empty")]
    EmptyTitle(TitleKind),

    /// The title exceeds the configured length.
    #[error("{kind} title exceeds {max} characters")]
    TitleTooLong {
        /// Entity the title belongs to.
        kind: TitleKind,
        /// Maximum number of characters.
        max: usize,
    },

    /// A task references a column that is not part of the board.
    #[error("task {0} belongs to a column outside the board")]
    OrphanTask(TaskId),

    /// The tag belongs to a different project than the board.
    #[error("tag {0} belongs to another project")]
    ForeignTag(TagId),

    /// The target column is on a different board than the task.
    #[error("column {0} is not on the task's board")]
    ForeignColumn(ColumnId),

    /// The user is not an accepted member of the board's project.
    #[error("user {0} is not a member of the board's project")]
    NonMemberAssignee(UserId),

    /// Order computation failed.
    #[error(transparent)]
    Ordering(#[from] OrderingError),
}

/// Errors returned by the ordering engine.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum OrderingError {
    /// An order value would not be a finite number.
    #[error("order value is not finite")]
    NonFinite,

    /// A list index is outside the sibling list.
    #[error("index {index} is out of range for {len} siblings")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of siblings.
        len: usize,
    },

    /// A neighbour identifier is not among the siblings.
    #[error("neighbour is not part of the sibling list")]
    UnknownSibling,

    /// The two neighbours are not next to each other.
    #[error("neighbours are not adjacent")]
    NotAdjacent,

    /// The ordering policy parameters are not positive finite numbers.
    #[error("ordering step and minimum gap must be positive and finite")]
    InvalidPolicy,
}
