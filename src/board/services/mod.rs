//! Orchestration services for boards.

mod config;
mod journal;
mod locks;
mod mutation;
mod snapshots;
mod state;

pub use config::BoardServiceConfig;
pub use locks::{AggregateGuard, AggregateKey, AggregateLocks};
pub use mutation::{BoardService, BoardServiceError, BoardServiceResult};
pub use snapshots::{Generation, SnapshotStore};
pub use state::BoardState;
