//! Compensation for multi-row order writes.

use crate::board::{
    domain::{Column, Task},
    ports::{BoardRepository, BoardRepositoryResult},
};
use tracing::warn;

#[derive(Debug)]
enum Undo {
    Column(Column),
    Task(Task),
}

/// Previous versions of every row a critical section has overwritten.
///
/// On failure the rows are written back newest first, returning the
/// aggregate to the state it had before the operation began.
#[derive(Debug, Default)]
pub(super) struct WriteJournal {
    undo: Vec<Undo>,
    written_columns: Vec<Column>,
    written_tasks: Vec<Task>,
}

impl WriteJournal {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) async fn update_column<B>(
        &mut self,
        repository: &B,
        previous: &Column,
        next: Column,
    ) -> BoardRepositoryResult<()>
    where
        B: BoardRepository + ?Sized,
    {
        repository.update_column(&next).await?;
        self.undo.push(Undo::Column(previous.clone()));
        self.written_columns.push(next);
        Ok(())
    }

    pub(super) async fn update_task<B>(
        &mut self,
        repository: &B,
        previous: &Task,
        next: Task,
    ) -> BoardRepositoryResult<()>
    where
        B: BoardRepository + ?Sized,
    {
        repository.update_task(&next).await?;
        self.undo.push(Undo::Task(previous.clone()));
        self.written_tasks.push(next);
        Ok(())
    }

    /// Columns written so far, in write order.
    pub(super) fn into_columns(self) -> Vec<Column> {
        self.written_columns
    }

    /// Tasks written so far, in write order.
    pub(super) fn into_tasks(self) -> Vec<Task> {
        self.written_tasks
    }

    /// Restores every overwritten row. Returns how many restores failed.
    pub(super) async fn rollback<B>(self, repository: &B) -> usize
    where
        B: BoardRepository + ?Sized,
    {
        let mut failures = 0_usize;
        for undo in self.undo.into_iter().rev() {
            let outcome = match &undo {
                Undo::Column(column) => repository.update_column(column).await,
                Undo::Task(task) => repository.update_task(task).await,
            };
            if let Err(err) = outcome {
                failures = failures.saturating_add(1);
                warn!(row = ?undo, error = %err, "failed to restore row during rollback");
            }
        }
        failures
    }
}
