//! Display aggregates derived from a [`BoardSnapshot`].
//!
//! Every function here is pure: it reads the snapshot (or a single record)
//! and returns a value for the view layer. Nothing is cached, so the
//! helpers can be re-run after every change.

mod time;

pub use time::relative_time;

use crate::board::domain::{BoardSnapshot, ColumnId, ColumnSnapshot, Task, TaskId};
use crate::identity::domain::UserId;
use crate::project::domain::{InvitationStatus, ProjectMember};
use chrono::{DateTime, Utc};

/// Tunables for projection helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionConfig {
    /// Number of assignee avatars shown before the overflow badge.
    pub visible_assignees: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            visible_assignees: 3,
        }
    }
}

/// Number of tasks in each column, in display order.
#[must_use]
pub fn task_counts(snapshot: &BoardSnapshot) -> Vec<(ColumnId, usize)> {
    snapshot
        .columns()
        .iter()
        .map(|entry| (entry.column().id(), task_count(entry)))
        .collect()
}

/// Number of tasks in one column.
#[must_use]
pub fn task_count(column: &ColumnSnapshot) -> usize {
    column.tasks().len()
}

/// Whether the task's due date lies before `now`. Tasks without a due date
/// are never overdue.
#[must_use]
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.due_date().is_some_and(|due| due < now)
}

/// Identifiers of every overdue task on the board, in display order.
#[must_use]
pub fn overdue_tasks(snapshot: &BoardSnapshot, now: DateTime<Utc>) -> Vec<TaskId> {
    snapshot
        .columns()
        .iter()
        .flat_map(ColumnSnapshot::tasks)
        .filter(|card| is_overdue(card.task(), now))
        .map(|card| card.task().id())
        .collect()
}

/// Assignees split into the avatars shown and the number left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssigneeOverflow<'a> {
    /// Assignees rendered as avatars.
    pub visible: &'a [UserId],
    /// Assignees summarised by the overflow badge.
    pub hidden: usize,
}

impl AssigneeOverflow<'_> {
    /// Overflow badge text such as `+2`, or `None` when nobody is hidden.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        (self.hidden > 0).then(|| format!("+{}", self.hidden))
    }
}

/// Splits `assignees` according to `config.visible_assignees`.
#[must_use]
pub fn assignee_overflow<'a>(
    assignees: &'a [UserId],
    config: &ProjectionConfig,
) -> AssigneeOverflow<'a> {
    let shown = assignees.len().min(config.visible_assignees);
    let (visible, rest) = assignees.split_at(shown);
    AssigneeOverflow {
        visible,
        hidden: rest.len(),
    }
}

/// Avatar fallback text: the first two characters, upper-cased.
#[must_use]
pub fn initials(name: &str) -> String {
    name.trim()
        .chars()
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Label shown next to a membership in the invitation list.
#[must_use]
pub const fn invitation_status_label(member: &ProjectMember) -> &'static str {
    match member.status() {
        InvitationStatus::Accepted => "Accepted",
        InvitationStatus::Pending => "Pending",
    }
}
