//! Validated display titles.

use super::{BoardDomainError, TitleKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trimmed, non-empty title bounded by a maximum character count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    /// Validates `raw` as a title of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTitle`] for blank input and
    /// [`BoardDomainError::TitleTooLong`] when the trimmed title has more than
    /// `max_chars` characters.
    pub fn parse(raw: &str, kind: TitleKind, max_chars: usize) -> Result<Self, BoardDomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BoardDomainError::EmptyTitle(kind));
        }
        if trimmed.chars().count() > max_chars {
            return Err(BoardDomainError::TitleTooLong {
                kind,
                max: max_chars,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the title, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
