//! Authenticated sessions and the explicit request context built from them.

use super::{Email, Profile, UserId};
use crate::identity::ports::{IdentityProvider, IdentityResult};
use serde::{Deserialize, Serialize};

/// Authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user_id: UserId,
    email: Email,
}

impl Session {
    /// Creates a session for the given user.
    #[must_use]
    pub const fn new(user_id: UserId, email: Email) -> Self {
        Self { user_id, email }
    }

    /// Returns the authenticated user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the authenticated email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }
}

/// Explicit caller context passed into every service operation.
///
/// An anonymous context is valid input; services reject it with an
/// authorization failure rather than a validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    session: Option<Session>,
    profile: Option<Profile>,
}

impl SessionContext {
    /// Context with no authenticated user.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            session: None,
            profile: None,
        }
    }

    /// Context for an authenticated user without a loaded profile.
    #[must_use]
    pub const fn authenticated(session: Session) -> Self {
        Self {
            session: Some(session),
            profile: None,
        }
    }

    /// Attaches the user's profile.
    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Builds a context from the identity provider's current session and the
    /// matching profile.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::identity::ports::IdentityError`] from the provider.
    pub async fn resolve<P>(provider: &P) -> IdentityResult<Self>
    where
        P: IdentityProvider + ?Sized,
    {
        let Some(session) = provider.current_session().await? else {
            return Ok(Self::anonymous());
        };
        let profile = provider.find_profile(session.user_id()).await?;
        Ok(Self {
            session: Some(session),
            profile,
        })
    }

    /// Returns the authenticated session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns the loaded profile, if any.
    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Whether the caller's profile grants access to every project.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.is_some() && self.profile.as_ref().is_some_and(|profile| profile.is_admin)
    }
}
