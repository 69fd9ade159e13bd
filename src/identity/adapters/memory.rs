//! In-memory identity provider for tests and offline use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::{
    domain::{Profile, Session, UserId},
    ports::{IdentityError, IdentityProvider, IdentityResult},
};

/// Identity provider whose session is set explicitly by the caller.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    state: Arc<RwLock<StaticIdentityState>>,
}

#[derive(Debug, Default)]
struct StaticIdentityState {
    session: Option<Session>,
    profiles: HashMap<UserId, Profile>,
}

impl StaticIdentityProvider {
    /// Creates a provider with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signs the given session in, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Transient`] when the state lock is poisoned.
    pub fn sign_in(&self, session: Session) -> IdentityResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.session = Some(session);
        Ok(())
    }

    /// Clears the current session.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Transient`] when the state lock is poisoned.
    pub fn sign_out(&self) -> IdentityResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.session = None;
        Ok(())
    }

    /// Inserts or replaces a user profile.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Transient`] when the state lock is poisoned.
    pub fn upsert_profile(&self, profile: Profile) -> IdentityResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.profiles.insert(profile.id, profile);
        Ok(())
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> IdentityError {
    IdentityError::transient(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_session(&self) -> IdentityResult<Option<Session>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.session.clone())
    }

    async fn find_profile(&self, user_id: UserId) -> IdentityResult<Option<Profile>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.profiles.get(&user_id).cloned())
    }
}
