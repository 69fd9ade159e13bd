//! Board service configuration.

use crate::board::domain::OrderingPolicy;

/// Tunables for [`super::BoardService`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardServiceConfig {
    /// Numeric scheme for column and task order values.
    pub ordering: OrderingPolicy,
    /// Maximum title length in characters for boards, columns and tasks.
    pub max_title_chars: usize,
}

impl Default for BoardServiceConfig {
    fn default() -> Self {
        Self {
            ordering: OrderingPolicy::default(),
            max_title_chars: Self::DEFAULT_MAX_TITLE_CHARS,
        }
    }
}

impl BoardServiceConfig {
    /// Title length used when none is configured.
    pub const DEFAULT_MAX_TITLE_CHARS: usize = 200;

    /// Replaces the ordering policy.
    #[must_use]
    pub const fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Replaces the maximum title length.
    #[must_use]
    pub const fn with_max_title_chars(mut self, max_title_chars: usize) -> Self {
        self.max_title_chars = max_title_chars;
        self
    }
}
