//! Project management: projects, their members and invitations, and tags.
//!
//! A project is the authorization boundary for every board beneath it:
//! membership roles decide who may mutate boards, columns and tasks. The
//! module follows the same hexagonal split as the board context:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
