//! Port contracts for board persistence.

pub mod repository;

pub use repository::{BoardEntityRef, BoardRepository, BoardRepositoryError, BoardRepositoryResult};
