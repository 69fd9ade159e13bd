//! Application services for projects, memberships and tags.

mod access;
mod lifecycle;

pub use access::{AccessError, Actor, authorize};
pub use lifecycle::{ProjectOverview, ProjectService, ProjectServiceError, ProjectServiceResult};
