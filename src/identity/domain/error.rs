//! Error types for identity value validation.

use thiserror::Error;

/// Errors returned while constructing identity values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The email address is malformed.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
}
