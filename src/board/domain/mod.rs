//! Domain model for boards, columns, tasks and their ordering.
//!
//! Nothing in this module performs I/O; order computation and snapshot
//! maintenance are pure functions over plain records.

mod board;
mod column;
mod error;
mod ids;
mod order;
mod ordering;
mod snapshot;
mod task;
mod title;

pub use board::{Board, PersistedBoardData};
pub use column::{Column, PersistedColumnData};
pub use error::{BoardDomainError, OrderingError, TitleKind};
pub use ids::{BoardId, ColumnId, TaskId};
pub use order::SortOrder;
pub use ordering::{Assignment, OrderingPolicy, Placement, Sibling};
pub use snapshot::{BoardSnapshot, ColumnSnapshot, SnapshotParts, TaskCard};
pub use task::{NewTask, PersistedTaskData, Task, TaskUpdate};
pub use title::Title;
