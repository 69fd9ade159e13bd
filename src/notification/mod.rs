//! User-facing notices emitted after board and project operations.
//!
//! Delivery is fire-and-forget: services hand a [`Notice`] to a
//! [`ports::Notifier`] and never depend on it arriving.

pub mod adapters;
mod notice;
pub mod ports;

pub use notice::{Notice, NoticeLevel};
