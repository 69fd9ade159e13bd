//! In-memory project repository for tests and offline use.

mod project;

pub use project::{InMemoryProjectRepository, ProjectOperation};
