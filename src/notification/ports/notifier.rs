//! Notifier port.

use crate::notification::Notice;

/// Fire-and-forget sink for user-facing notices.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Delivers a notice. Implementations must not block or fail.
    fn notify(&self, notice: Notice);
}
