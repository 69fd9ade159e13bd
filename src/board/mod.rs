//! Boards, columns and tasks: the ordering and mutation model.
//!
//! A board owns the left-to-right order of its columns and each column owns
//! the top-to-bottom order of its tasks. Every structural change goes
//! through [`services::BoardService`], which authorises the caller,
//! serialises writes per aggregate, computes order values with
//! [`domain::OrderingPolicy`], persists through [`ports::BoardRepository`],
//! and keeps open [`domain::BoardSnapshot`]s current. Display aggregates are
//! derived by the pure helpers in [`projection`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod projection;
pub mod services;

#[cfg(test)]
mod tests;
