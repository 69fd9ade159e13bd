//! Thread-safe in-memory board repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::board::{
    domain::{Board, BoardId, Column, ColumnId, Task, TaskId},
    ports::{BoardEntityRef, BoardRepository, BoardRepositoryError, BoardRepositoryResult},
};
use crate::identity::domain::UserId;
use crate::project::domain::{ProjectId, TagId};

/// Write operations that can be made to fail for compensation tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardOperation {
    /// [`BoardRepository::store_column`].
    StoreColumn,
    /// [`BoardRepository::update_column`].
    UpdateColumn,
    /// [`BoardRepository::store_task`].
    StoreTask,
    /// [`BoardRepository::update_task`].
    UpdateTask,
    /// [`BoardRepository::delete_column`].
    DeleteColumn,
    /// [`BoardRepository::link_tag`].
    LinkTag,
}

/// Thread-safe in-memory board repository.
///
/// Every call yields to the scheduler once before touching state, so
/// concurrent callers interleave the way they would against a remote
/// backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardRepository {
    state: Arc<RwLock<InMemoryBoardState>>,
}

#[derive(Debug, Default)]
struct InMemoryBoardState {
    boards: HashMap<BoardId, Board>,
    columns: HashMap<ColumnId, Column>,
    tasks: HashMap<TaskId, Task>,
    tag_links: Vec<(TaskId, TagId)>,
    assignee_links: Vec<(TaskId, UserId)>,
    faults: HashMap<BoardOperation, usize>,
}

impl InMemoryBoardRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `operation` succeed `successes` more times, then fails the next
    /// call with a transient error.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::Transient`] when the state lock is
    /// poisoned.
    pub fn fail_after(
        &self,
        operation: BoardOperation,
        successes: usize,
    ) -> BoardRepositoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.faults.insert(operation, successes);
        Ok(())
    }

    /// Returns the number of stored tasks across every board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::Transient`] when the state lock is
    /// poisoned.
    pub fn task_count(&self) -> BoardRepositoryResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.len())
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> BoardRepositoryError {
    BoardRepositoryError::transient(std::io::Error::other(err.to_string()))
}

fn check_fault(
    state: &mut InMemoryBoardState,
    operation: BoardOperation,
) -> BoardRepositoryResult<()> {
    let Some(remaining) = state.faults.get_mut(&operation) else {
        return Ok(());
    };
    if let Some(left) = remaining.checked_sub(1) {
        *remaining = left;
        return Ok(());
    }
    state.faults.remove(&operation);
    Err(BoardRepositoryError::transient(std::io::Error::other(
        format!("injected failure for {operation:?}"),
    )))
}

fn remove_task_rows(state: &mut InMemoryBoardState, doomed: &[TaskId]) {
    state.tasks.retain(|id, _| !doomed.contains(id));
    state.tag_links.retain(|(task_id, _)| !doomed.contains(task_id));
    state
        .assignee_links
        .retain(|(task_id, _)| !doomed.contains(task_id));
}

fn column_task_ids(state: &InMemoryBoardState, column_id: ColumnId) -> Vec<TaskId> {
    state
        .tasks
        .values()
        .filter(|task| task.column_id() == column_id)
        .map(Task::id)
        .collect()
}

fn ensure_task(state: &InMemoryBoardState, task_id: TaskId) -> BoardRepositoryResult<()> {
    if state.tasks.contains_key(&task_id) {
        Ok(())
    } else {
        Err(BoardRepositoryError::NotFound(BoardEntityRef::Task(task_id)))
    }
}

#[async_trait]
impl BoardRepository for InMemoryBoardRepository {
    async fn store_board(&self, board: &Board) -> BoardRepositoryResult<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        if state.boards.contains_key(&board.id()) {
            return Err(BoardRepositoryError::Conflict(format!(
                "duplicate board identifier: {}",
                board.id()
            )));
        }
        state.boards.insert(board.id(), board.clone());
        Ok(())
    }

    async fn find_board(&self, id: BoardId) -> BoardRepositoryResult<Option<Board>> {
        tokio::task::yield_now().await;
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.boards.get(&id).cloned())
    }

    async fn list_boards(&self, project_id: ProjectId) -> BoardRepositoryResult<Vec<Board>> {
        tokio::task::yield_now().await;
        let state = self.state.read().map_err(poisoned)?;
        let mut boards: Vec<Board> = state
            .boards
            .values()
            .filter(|board| board.project_id() == project_id)
            .cloned()
            .collect();
        boards.sort_by_key(Board::created_at);
        Ok(boards)
    }

    async fn delete_board(&self, id: BoardId) -> BoardRepositoryResult<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        if state.boards.remove(&id).is_none() {
            return Err(BoardRepositoryError::NotFound(BoardEntityRef::Board(id)));
        }
        let column_ids: Vec<ColumnId> = state
            .columns
            .values()
            .filter(|column| column.board_id() == id)
            .map(Column::id)
            .collect();
        let doomed: Vec<TaskId> = column_ids
            .iter()
            .flat_map(|column_id| column_task_ids(&state, *column_id))
            .collect();
        state.columns.retain(|column_id, _| !column_ids.contains(column_id));
        remove_task_rows(&mut state, &doomed);
        Ok(())
    }

    async fn store_column(&self, column: &Column) -> BoardRepositoryResult<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        check_fault(&mut state, BoardOperation::StoreColumn)?;
        if !state.boards.contains_key(&column.board_id()) {
            return Err(BoardRepositoryError::NotFound(BoardEntityRef::Board(
                column.board_id(),
            )));
        }
        if state.columns.contains_key(&column.id()) {
            return Err(BoardRepositoryError::Conflict(format!(
                "duplicate column identifier: {}",
                column.id()
            )));
        }
        state.columns.insert(column.id(), column.clone());
        Ok(())
    }

    async fn update_column(&self, column: &Column) -> BoardRepositoryResult<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        check_fault(&mut state, BoardOperation::UpdateColumn)?;
        let slot = state
            .columns
            .get_mut(&column.id())
            .ok_or(BoardRepositoryError::NotFound(BoardEntityRef::Column(
                column.id(),
            )))?;
        *slot = column.clone();
        Ok(())
    }

    async fn find_column(&self, id: ColumnId) -> BoardRepositoryResult<Option<Column>> {
        tokio::task::yield_now().await;
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.columns.get(&id).cloned())
    }

    async fn list_columns(&self, board_id: BoardId) -> BoardRepositoryResult<Vec<Column>> {
        tokio::task::yield_now().await;
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .columns
            .values()
            .filter(|column| column.board_id() == board_id)
            .cloned()
            .collect())
    }

    async fn delete_column(&self, id: ColumnId) -> BoardRepositoryResult<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        check_fault(&mut state, BoardOperation::DeleteColumn)?;
        if state.columns.remove(&id).is_none() {
            return Err(BoardRepositoryError::NotFound(BoardEntityRef::Column(id)));
        }
        let doomed = column_task_ids(&state, id);
        remove_task_rows(&mut state, &doomed);
        Ok(())
    }

    async fn store_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        check_fault(&mut state, BoardOperation::StoreTask)?;
        if !state.columns.contains_key(&task.column_id()) {
            return Err(BoardRepositoryError::NotFound(BoardEntityRef::Column(
                task.column_id(),
            )));
        }
        if state.tasks.contains_key(&task.id()) {
            return Err(BoardRepositoryError::Conflict(format!(
                "duplicate task identifier: {}",
                task.id()
            )));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        check_fault(&mut state, BoardOperation::UpdateTask)?;
        if !state.columns.contains_key(&task.column_id()) {
            return Err(BoardRepositoryError::NotFound(BoardEntityRef::Column(
                task.column_id(),
            )));
        }
        let slot = state
            .tasks
            .get_mut(&task.id())
            .ok_or(BoardRepositoryError::NotFound(BoardEntityRef::Task(task.id())))?;
        *slot = task.clone();
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        tokio::task::yield_now().await;
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, column_id: ColumnId) -> BoardRepositoryResult<Vec<Task>> {
        tokio::task::yield_now().await;
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.column_id() == column_id)
            .cloned()
            .collect())
    }

    async fn delete_task(&self, id: TaskId) -> BoardRepositoryResult<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        ensure_task(&state, id)?;
        remove_task_rows(&mut state, &[id]);
        Ok(())
    }

    async fn link_tag(&self, task_id: TaskId, tag_id: TagId) -> BoardRepositoryResult<bool> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        check_fault(&mut state, BoardOperation::LinkTag)?;
        ensure_task(&state, task_id)?;
        if state.tag_links.contains(&(task_id, tag_id)) {
            return Ok(false);
        }
        state.tag_links.push((task_id, tag_id));
        Ok(true)
    }

    async fn unlink_tag(&self, task_id: TaskId, tag_id: TagId) -> BoardRepositoryResult<bool> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        let before = state.tag_links.len();
        state.tag_links.retain(|link| *link != (task_id, tag_id));
        Ok(state.tag_links.len() != before)
    }

    async fn task_tags(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<TagId>> {
        tokio::task::yield_now().await;
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .tag_links
            .iter()
            .filter(|(linked_task, _)| *linked_task == task_id)
            .map(|(_, tag_id)| *tag_id)
            .collect())
    }

    async fn unlink_tag_everywhere(&self, tag_id: TagId) -> BoardRepositoryResult<usize> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        let before = state.tag_links.len();
        state.tag_links.retain(|(_, linked_tag)| *linked_tag != tag_id);
        Ok(before.saturating_sub(state.tag_links.len()))
    }

    async fn link_assignee(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> BoardRepositoryResult<bool> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        ensure_task(&state, task_id)?;
        if state.assignee_links.contains(&(task_id, user_id)) {
            return Ok(false);
        }
        state.assignee_links.push((task_id, user_id));
        Ok(true)
    }

    async fn unlink_assignee(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> BoardRepositoryResult<bool> {
        tokio::task::yield_now().await;
        let mut state = self.state.write().map_err(poisoned)?;
        let before = state.assignee_links.len();
        state.assignee_links.retain(|link| *link != (task_id, user_id));
        Ok(state.assignee_links.len() != before)
    }

    async fn task_assignees(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<UserId>> {
        tokio::task::yield_now().await;
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .assignee_links
            .iter()
            .filter(|(linked_task, _)| *linked_task == task_id)
            .map(|(_, user_id)| *user_id)
            .collect())
    }
}
