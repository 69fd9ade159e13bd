//! Critical sections and open snapshots shared by every service that writes
//! board rows.

use super::{
    locks::{AggregateKey, AggregateLocks},
    snapshots::SnapshotStore,
};
use std::future::Future;
use tokio::task::JoinError;

/// Lock registry and snapshot store for one set of board rows.
///
/// Services that write the same rows must share one `BoardState`, otherwise
/// their critical sections do not exclude each other.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub(super) locks: AggregateLocks,
    pub(super) snapshots: SnapshotStore,
}

impl BoardState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the aggregate lock registry.
    #[must_use]
    pub const fn locks(&self) -> &AggregateLocks {
        &self.locks
    }

    /// Returns the open snapshots.
    #[must_use]
    pub const fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Runs `work` while holding every key, on a task of its own.
    ///
    /// The guards move into the spawned task, so the write sequence finishes
    /// even if the caller stops waiting.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] when the spawned task panicked or was
    /// aborted.
    pub async fn run_exclusive<T, I, F>(&self, keys: I, work: F) -> Result<T, JoinError>
    where
        I: IntoIterator<Item = AggregateKey>,
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.locks.acquire(keys).await;
        tokio::spawn(async move {
            let held = guard;
            let outcome = work.await;
            drop(held);
            outcome
        })
        .await
    }
}
