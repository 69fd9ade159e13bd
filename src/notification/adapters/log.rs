//! Notifier that forwards notices to the `tracing` subscriber.

use crate::notification::{Notice, NoticeLevel, ports::Notifier};

/// Emits each notice as a `tracing` event on the `taskboard::notice` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => {
                tracing::info!(target: "taskboard::notice", message = %notice.message);
            }
            NoticeLevel::Error => {
                tracing::warn!(target: "taskboard::notice", message = %notice.message);
            }
        }
    }
}
