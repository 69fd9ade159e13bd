//! Open board snapshots and their generations.

use crate::board::domain::{BoardId, BoardSnapshot};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Generation stamp of an open snapshot.
///
/// Every [`SnapshotStore::open`] issues a fresh generation, so a result
/// computed against a board that was closed (or closed and reopened) in the
/// meantime can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

#[derive(Debug, Default)]
struct SnapshotState {
    next: u64,
    open: HashMap<BoardId, (Generation, BoardSnapshot)>,
}

/// Boards currently displayed, keyed by board identifier.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    state: Arc<RwLock<SnapshotState>>,
}

impl SnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `snapshot` under a new generation, replacing any open one.
    pub async fn open(&self, snapshot: BoardSnapshot) -> Generation {
        let mut state = self.state.write().await;
        state.next = state.next.wrapping_add(1);
        let generation = Generation(state.next);
        state
            .open
            .insert(snapshot.board().id(), (generation, snapshot));
        generation
    }

    /// Drops the snapshot of `board_id`. Returns whether one was open.
    pub async fn close(&self, board_id: BoardId) -> bool {
        self.state.write().await.open.remove(&board_id).is_some()
    }

    /// Returns the generation of the open snapshot, if any.
    pub async fn generation(&self, board_id: BoardId) -> Option<Generation> {
        self.state
            .read()
            .await
            .open
            .get(&board_id)
            .map(|(generation, _)| *generation)
    }

    /// Returns a copy of the open snapshot, if any.
    pub async fn get(&self, board_id: BoardId) -> Option<BoardSnapshot> {
        self.state
            .read()
            .await
            .open
            .get(&board_id)
            .map(|(_, snapshot)| snapshot.clone())
    }

    /// Applies `update` to the open snapshot of `board_id`, whatever its
    /// generation. Returns whether one was open.
    ///
    /// Callers must hold the aggregate keys that cover what `update` touches.
    pub async fn update_open<F>(&self, board_id: BoardId, update: F) -> bool
    where
        F: FnOnce(&mut BoardSnapshot),
    {
        let mut state = self.state.write().await;
        state
            .open
            .get_mut(&board_id)
            .map(|(_, snapshot)| update(snapshot))
            .is_some()
    }

    /// Applies `update` if the board is still open under `expected`.
    ///
    /// Returns `false` without touching anything when the board was not open
    /// when the operation started, or when its generation has moved on.
    pub async fn apply_if_current<F>(
        &self,
        board_id: BoardId,
        expected: Option<Generation>,
        update: F,
    ) -> bool
    where
        F: FnOnce(&mut BoardSnapshot),
    {
        let Some(expected_generation) = expected else {
            return false;
        };
        let mut state = self.state.write().await;
        match state.open.get_mut(&board_id) {
            Some((generation, snapshot)) if *generation == expected_generation => {
                update(snapshot);
                true
            }
            _ => {
                warn!(%board_id, "discarding result for a board that is no longer displayed");
                false
            }
        }
    }
}
