//! Task card records and their input types.

use super::{ColumnId, Sibling, SortOrder, TaskId, Title};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A task card. It belongs to exactly one column at a time; `position`
/// fixes its place in that column's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    column_id: ColumnId,
    title: String,
    description: Option<String>,
    cover_image: Option<String>,
    due_date: Option<DateTime<Utc>>,
    position: SortOrder,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Column currently holding the task.
    pub column_id: ColumnId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted cover image reference.
    pub cover_image: Option<String>,
    /// Persisted due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted position within the column.
    pub position: SortOrder,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Caller input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: Option<String>,
    cover_image: Option<String>,
    due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Creates task input with a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            cover_image: None,
            due_date: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the cover image reference.
    #[must_use]
    pub fn with_cover_image(mut self, cover_image: impl Into<String>) -> Self {
        self.cover_image = Some(cover_image.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Returns the raw, unvalidated title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Partial update of a task's content fields.
///
/// Fields left untouched keep their value; `Some(None)` clears an optional
/// field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    title: Option<String>,
    description: Option<Option<String>>,
    cover_image: Option<Option<String>>,
    due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces or clears the description.
    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces or clears the cover image.
    #[must_use]
    pub fn cover_image(mut self, cover_image: Option<String>) -> Self {
        self.cover_image = Some(cover_image);
        self
    }

    /// Replaces or clears the due date.
    #[must_use]
    pub const fn due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Returns the requested title, if any.
    #[must_use]
    pub fn requested_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.cover_image.is_none()
            && self.due_date.is_none()
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|value| !value.trim().is_empty())
}

impl Task {
    /// Creates a task at `position` in `column_id` from validated input.
    #[must_use]
    pub fn new(
        column_id: ColumnId,
        title: Title,
        input: NewTask,
        position: SortOrder,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            column_id,
            title: title.into_inner(),
            description: non_blank(input.description),
            cover_image: non_blank(input.cover_image),
            due_date: input.due_date,
            position,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            column_id: data.column_id,
            title: data.title,
            description: data.description,
            cover_image: data.cover_image,
            due_date: data.due_date,
            position: data.position,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the column holding the task.
    #[must_use]
    pub const fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the cover image reference, if any.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.cover_image.as_deref()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the position within the column.
    #[must_use]
    pub const fn position(&self) -> SortOrder {
        self.position
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

    /// Returns the task as an entry of its column's sibling list.
    #[must_use]
    pub const fn as_sibling(&self) -> Sibling<TaskId> {
        Sibling::new(self.id, self.position)
    }

    pub(crate) fn relocate(
        &mut self,
        column_id: ColumnId,
        position: SortOrder,
        clock: &impl Clock,
    ) {
        self.column_id = column_id;
        self.position = position;
        self.updated_at = clock.utc();
    }

    /// Applies `update`; `title` must already be validated when present.
    pub(crate) fn apply_update(
        &mut self,
        title: Option<Title>,
        update: TaskUpdate,
        clock: &impl Clock,
    ) {
        if let Some(validated) = title {
            self.title = validated.into_inner();
        }
        if let Some(description) = update.description {
            self.description = non_blank(description);
        }
        if let Some(cover_image) = update.cover_image {
            self.cover_image = non_blank(cover_image);
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        self.updated_at = clock.utc();
    }
}
