//! In-memory read model of one open board.
//!
//! A [`BoardSnapshot`] is what the view layer renders: the board, its
//! columns in display order, each column's task cards in display order, and
//! the project tags the cards reference. Services keep it current after each
//! successful write; [`crate::board::projection`] derives display values
//! from it.

use super::{Board, BoardDomainError, Column, ColumnId, Task, TaskId};
use crate::identity::domain::UserId;
use crate::project::domain::{Tag, TagId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A task together with its tag and assignee links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCard {
    task: Task,
    tag_ids: Vec<TagId>,
    assignees: Vec<UserId>,
}

impl TaskCard {
    /// Creates a card without links.
    #[must_use]
    pub const fn new(task: Task) -> Self {
        Self {
            task,
            tag_ids: Vec::new(),
            assignees: Vec::new(),
        }
    }

    /// Returns the task record.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the linked tag identifiers in link order.
    #[must_use]
    pub fn tag_ids(&self) -> &[TagId] {
        &self.tag_ids
    }

    /// Returns the assigned users in assignment order.
    #[must_use]
    pub fn assignees(&self) -> &[UserId] {
        &self.assignees
    }
}

/// A column together with its task cards in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    column: Column,
    tasks: Vec<TaskCard>,
}

impl ColumnSnapshot {
    /// Returns the column record.
    #[must_use]
    pub const fn column(&self) -> &Column {
        &self.column
    }

    /// Returns the task cards in display order.
    #[must_use]
    pub fn tasks(&self) -> &[TaskCard] {
        &self.tasks
    }

    /// Returns the task identifiers in display order.
    #[must_use]
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|card| card.task.id()).collect()
    }

    fn sort(&mut self) {
        self.tasks.sort_by_key(|card| card.task.position());
    }
}

/// Rows loaded from persistence that make up one board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotParts {
    /// Columns of the board, in any order.
    pub columns: Vec<Column>,
    /// Tasks of those columns, in any order.
    pub tasks: Vec<Task>,
    /// Task-tag links.
    pub tag_links: Vec<(TaskId, TagId)>,
    /// Task-assignee links.
    pub assignee_links: Vec<(TaskId, UserId)>,
    /// Tags of the board's project.
    pub tags: Vec<Tag>,
}

/// Ordered read model of one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    board: Board,
    columns: Vec<ColumnSnapshot>,
    tags: Vec<Tag>,
}

impl BoardSnapshot {
    /// Assembles a snapshot from persisted rows, sorting columns and tasks
    /// into display order. Links to unknown tasks are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::OrphanTask`] when a task references a
    /// column that is not among `parts.columns`.
    pub fn assemble(board: Board, parts: SnapshotParts) -> Result<Self, BoardDomainError> {
        let mut columns: Vec<ColumnSnapshot> = parts
            .columns
            .into_iter()
            .filter(|column| column.board_id() == board.id())
            .map(|column| ColumnSnapshot {
                column,
                tasks: Vec::new(),
            })
            .collect();
        columns.sort_by_key(|entry| entry.column.order());

        let mut tags_by_task: HashMap<TaskId, Vec<TagId>> = HashMap::new();
        for (task_id, tag_id) in parts.tag_links {
            let linked = tags_by_task.entry(task_id).or_default();
            if !linked.contains(&tag_id) {
                linked.push(tag_id);
            }
        }
        let mut assignees_by_task: HashMap<TaskId, Vec<UserId>> = HashMap::new();
        for (task_id, user_id) in parts.assignee_links {
            let assigned = assignees_by_task.entry(task_id).or_default();
            if !assigned.contains(&user_id) {
                assigned.push(user_id);
            }
        }

        for task in parts.tasks {
            let entry = columns
                .iter_mut()
                .find(|entry| entry.column.id() == task.column_id())
                .ok_or(BoardDomainError::OrphanTask(task.id()))?;
            entry.tasks.push(TaskCard {
                tag_ids: tags_by_task.remove(&task.id()).unwrap_or_default(),
                assignees: assignees_by_task.remove(&task.id()).unwrap_or_default(),
                task,
            });
        }
        for entry in &mut columns {
            entry.sort();
        }

        let mut tags = parts.tags;
        tags.sort_by_key(Tag::name_key);
        Ok(Self {
            board,
            columns,
            tags,
        })
    }

    /// Returns the board record.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSnapshot] {
        &self.columns
    }

    /// Returns the column identifiers in display order.
    #[must_use]
    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|entry| entry.column.id()).collect()
    }

    /// Finds a column by identifier.
    #[must_use]
    pub fn column(&self, id: ColumnId) -> Option<&ColumnSnapshot> {
        self.columns.iter().find(|entry| entry.column.id() == id)
    }

    /// Finds a task card by identifier.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&TaskCard> {
        self.columns
            .iter()
            .flat_map(|entry| entry.tasks.iter())
            .find(|card| card.task.id() == id)
    }

    /// Returns the project tags known to the snapshot, ordered by name.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Resolves the tags linked to a card; unknown tag ids are skipped.
    #[must_use]
    pub fn tags_for(&self, card: &TaskCard) -> Vec<&Tag> {
        card.tag_ids
            .iter()
            .filter_map(|id| self.tags.iter().find(|tag| tag.id == *id))
            .collect()
    }

    pub(crate) fn upsert_columns(&mut self, updated: &[Column]) {
        for column in updated {
            if let Some(entry) = self
                .columns
                .iter_mut()
                .find(|entry| entry.column.id() == column.id())
            {
                entry.column = column.clone();
            } else if column.board_id() == self.board.id() {
                self.columns.push(ColumnSnapshot {
                    column: column.clone(),
                    tasks: Vec::new(),
                });
            }
        }
        self.columns.sort_by_key(|entry| entry.column.order());
    }

    pub(crate) fn remove_column(&mut self, id: ColumnId) {
        self.columns.retain(|entry| entry.column.id() != id);
    }

    /// Inserts or moves tasks to the columns their records point at.
    pub(crate) fn upsert_tasks(&mut self, updated: &[Task]) {
        for task in updated {
            let existing = self.take_card(task.id());
            let Some(entry) = self
                .columns
                .iter_mut()
                .find(|entry| entry.column.id() == task.column_id())
            else {
                continue;
            };
            let card = existing.map_or_else(
                || TaskCard::new(task.clone()),
                |mut card| {
                    card.task = task.clone();
                    card
                },
            );
            entry.tasks.push(card);
            entry.sort();
        }
    }

    pub(crate) fn remove_task(&mut self, id: TaskId) {
        self.take_card(id);
    }

    pub(crate) fn link_tag(&mut self, task_id: TaskId, tag: &Tag) {
        if !self.tags.iter().any(|known| known.id == tag.id) {
            self.tags.push(tag.clone());
            self.tags.sort_by_key(Tag::name_key);
        }
        if let Some(card) = self.card_mut(task_id) {
            if !card.tag_ids.contains(&tag.id) {
                card.tag_ids.push(tag.id);
            }
        }
    }

    pub(crate) fn unlink_tag(&mut self, task_id: TaskId, tag_id: TagId) {
        if let Some(card) = self.card_mut(task_id) {
            card.tag_ids.retain(|id| *id != tag_id);
        }
    }

    /// Forgets a deleted tag and every card link to it.
    pub(crate) fn remove_tag(&mut self, tag_id: TagId) {
        self.tags.retain(|known| known.id != tag_id);
        for card in self
            .columns
            .iter_mut()
            .flat_map(|entry| entry.tasks.iter_mut())
        {
            card.tag_ids.retain(|id| *id != tag_id);
        }
    }

    pub(crate) fn link_assignee(&mut self, task_id: TaskId, user_id: UserId) {
        if let Some(card) = self.card_mut(task_id) {
            if !card.assignees.contains(&user_id) {
                card.assignees.push(user_id);
            }
        }
    }

    pub(crate) fn unlink_assignee(&mut self, task_id: TaskId, user_id: UserId) {
        if let Some(card) = self.card_mut(task_id) {
            card.assignees.retain(|id| *id != user_id);
        }
    }

    fn card_mut(&mut self, id: TaskId) -> Option<&mut TaskCard> {
        self.columns
            .iter_mut()
            .flat_map(|entry| entry.tasks.iter_mut())
            .find(|card| card.task.id() == id)
    }

    fn take_card(&mut self, id: TaskId) -> Option<TaskCard> {
        self.columns.iter_mut().find_map(|entry| {
            let index = entry.tasks.iter().position(|card| card.task.id() == id)?;
            Some(entry.tasks.remove(index))
        })
    }
}
