//! Identity provider port.

use crate::identity::domain::{Profile, Session, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for identity provider operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Source of the current authenticated session and user profiles.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the current session, or `None` when nobody is signed in.
    async fn current_session(&self) -> IdentityResult<Option<Session>>;

    /// Finds the profile for a user.
    ///
    /// Returns `None` when the user has no profile row.
    async fn find_profile(&self, user_id: UserId) -> IdentityResult<Option<Profile>>;
}

/// Errors returned by identity provider implementations.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// The provider could not be reached or failed transiently.
    #[error("identity provider unavailable: {0}")]
    Transient(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdentityError {
    /// Wraps a transient provider failure.
    pub fn transient(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transient(Arc::new(err))
    }
}
