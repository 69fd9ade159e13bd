//! Taskboard: the ordering and mutation core of a Kanban project tool.
//!
//! Projects hold boards, boards hold an ordered list of columns, and columns
//! hold an ordered list of task cards. This crate owns the rules for keeping
//! those lists ordered while many callers change them, and delegates storage,
//! sign-in and user notices to external collaborators.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure records, validation and order computation
//! - **Ports**: Abstract trait interfaces for persistence, identity and notices
//! - **Adapters**: In-memory implementations of ports and legacy decoders
//! - **Services**: Authorised, serialised mutation entry points
//!
//! # Modules
//!
//! - [`board`]: Boards, columns, tasks, ordering and view projections
//! - [`project`]: Projects, memberships, invitations and tags
//! - [`identity`]: Sessions and profiles passed explicitly into services
//! - [`notification`]: Fire-and-forget user notices

mod identifier;

pub mod board;
pub mod identity;
pub mod notification;
pub mod project;
