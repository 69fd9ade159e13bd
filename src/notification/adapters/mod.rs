//! Notifier adapters.

mod log;
pub mod memory;

pub use log::TracingNotifier;
