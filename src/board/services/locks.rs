//! Per-aggregate critical sections.
//!
//! A board serialises changes to its column list, a column serialises
//! changes to its task list and a project serialises changes to its tag set.
//! Operations that touch several aggregates take
//! every key up front in [`AggregateKey`] order, so two operations can never
//! wait on each other in a cycle.

use crate::board::domain::{BoardId, ColumnId};
use crate::project::domain::ProjectId;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// An aggregate root that owns an ordered child list.
///
/// Boards sort before columns, columns before tag sets, then keys sort by
/// identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AggregateKey {
    /// A board's column list.
    Board(BoardId),
    /// A column's task list.
    Column(ColumnId),
    /// A project's tag set and every link to it.
    Tags(ProjectId),
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board(id) => write!(f, "board {id}"),
            Self::Column(id) => write!(f, "column {id}"),
            Self::Tags(id) => write!(f, "tags of project {id}"),
        }
    }
}

/// Registry of one async mutex per aggregate key.
///
/// Entries are created on first use and pruned once nobody holds or awaits
/// them.
#[derive(Debug, Clone, Default)]
pub struct AggregateLocks {
    registry: Arc<Mutex<HashMap<AggregateKey, Arc<Mutex<()>>>>>,
}

/// Exclusive access to a set of aggregates, released on drop.
#[derive(Debug)]
pub struct AggregateGuard {
    keys: Vec<AggregateKey>,
    _held: Vec<OwnedMutexGuard<()>>,
}

impl AggregateGuard {
    /// Returns the held keys in acquisition order.
    #[must_use]
    pub fn keys(&self) -> &[AggregateKey] {
        &self.keys
    }
}

impl AggregateLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to every key in `keys`.
    ///
    /// Duplicate keys are collapsed. Keys are locked in sorted order.
    pub async fn acquire<I>(&self, keys: I) -> AggregateGuard
    where
        I: IntoIterator<Item = AggregateKey>,
    {
        let ordered: BTreeSet<AggregateKey> = keys.into_iter().collect();
        let mutexes: Vec<Arc<Mutex<()>>> = {
            let mut registry = self.registry.lock().await;
            registry.retain(|_, lock| Arc::strong_count(lock) > 1);
            ordered
                .iter()
                .map(|key| Arc::clone(registry.entry(*key).or_default()))
                .collect()
        };

        let mut held = Vec::with_capacity(mutexes.len());
        for mutex in mutexes {
            held.push(mutex.lock_owned().await);
        }
        AggregateGuard {
            keys: ordered.into_iter().collect(),
            _held: held,
        }
    }

    /// Number of keys currently tracked by the registry.
    pub async fn tracked(&self) -> usize {
        let registry = self.registry.lock().await;
        registry
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}
