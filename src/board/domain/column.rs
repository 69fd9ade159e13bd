//! Column records.

use super::{BoardId, ColumnId, Sibling, SortOrder, Title};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A column on a board; `order` fixes its left-to-right position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    id: ColumnId,
    board_id: BoardId,
    title: String,
    order: SortOrder,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedColumnData {
    /// Persisted column identifier.
    pub id: ColumnId,
    /// Owning board.
    pub board_id: BoardId,
    /// Persisted title.
    pub title: String,
    /// Persisted order value.
    pub order: SortOrder,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Column {
    /// Creates a new column at `order` on `board_id`.
    #[must_use]
    pub fn new(board_id: BoardId, title: Title, order: SortOrder, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ColumnId::new(),
            board_id,
            title: title.into_inner(),
            order,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a column from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedColumnData) -> Self {
        Self {
            id: data.id,
            board_id: data.board_id,
            title: data.title,
            order: data.order,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the column title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the order value.
    #[must_use]
    pub const fn order(&self) -> SortOrder {
        self.order
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

    /// Returns the column as an entry of its board's sibling list.
    #[must_use]
    pub const fn as_sibling(&self) -> Sibling<ColumnId> {
        Sibling::new(self.id, self.order)
    }

    pub(crate) fn set_order(&mut self, order: SortOrder, clock: &impl Clock) {
        self.order = order;
        self.updated_at = clock.utc();
    }

    pub(crate) fn rename(&mut self, title: Title, clock: &impl Clock) {
        self.title = title.into_inner();
        self.updated_at = clock.utc();
    }
}
