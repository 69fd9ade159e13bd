//! Port contracts for project persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by project and board
//! services.

pub mod repository;

pub use repository::{
    ProjectEntityRef, ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult,
};
