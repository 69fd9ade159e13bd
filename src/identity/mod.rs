//! Identity context: who is acting on the board.
//!
//! The hosted authentication provider sits behind the [`ports::IdentityProvider`]
//! port. Services never read ambient session state; callers resolve a
//! [`domain::SessionContext`] once and pass it explicitly into every
//! mutation.

pub mod adapters;
pub mod domain;
pub mod ports;
