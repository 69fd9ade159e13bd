//! Project memberships and client invitations.

use super::{MemberId, MemberRole, ProjectDomainError, ProjectId};
use crate::identity::domain::{Email, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Whether an invited member has joined the project yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// The invitation has been sent but not accepted.
    Pending,
    /// The member has joined the project.
    Accepted,
}

impl InvitationStatus {
    /// Returns the canonical lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
        }
    }
}

/// Membership of a user (or invited email) in a project.
///
/// `user_id` is unset while an invitation is pending; accepting the
/// invitation binds it to the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    id: MemberId,
    project_id: ProjectId,
    user_id: Option<UserId>,
    role: MemberRole,
    email: Email,
    invitation_accepted: bool,
    invited_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMemberData {
    /// Persisted membership identifier.
    pub id: MemberId,
    /// Project the membership belongs to.
    pub project_id: ProjectId,
    /// Bound user, if the invitation was accepted.
    pub user_id: Option<UserId>,
    /// Persisted role.
    pub role: MemberRole,
    /// Invited email address.
    pub email: Email,
    /// Whether the invitation was accepted.
    pub invitation_accepted: bool,
    /// Invitation timestamp.
    pub invited_at: DateTime<Utc>,
}

impl ProjectMember {
    /// Creates the accepted owner membership for a new project.
    #[must_use]
    pub fn owner(project_id: ProjectId, user_id: UserId, email: Email, clock: &impl Clock) -> Self {
        Self {
            id: MemberId::new(),
            project_id,
            user_id: Some(user_id),
            role: MemberRole::Owner,
            email,
            invitation_accepted: true,
            invited_at: clock.utc(),
        }
    }

    /// Creates a pending invitation for `email`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::OwnerRoleNotInvitable`] when `role` is
    /// [`MemberRole::Owner`].
    pub fn invite(
        project_id: ProjectId,
        email: Email,
        role: MemberRole,
        clock: &impl Clock,
    ) -> Result<Self, ProjectDomainError> {
        if role == MemberRole::Owner {
            return Err(ProjectDomainError::OwnerRoleNotInvitable);
        }
        Ok(Self {
            id: MemberId::new(),
            project_id,
            user_id: None,
            role,
            email,
            invitation_accepted: false,
            invited_at: clock.utc(),
        })
    }

    /// Reconstructs a membership from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMemberData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            user_id: data.user_id,
            role: data.role,
            email: data.email,
            invitation_accepted: data.invitation_accepted,
            invited_at: data.invited_at,
        }
    }

    /// Returns the membership identifier.
    #[must_use]
    pub const fn id(&self) -> MemberId {
        self.id
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the bound user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns the member role.
    #[must_use]
    pub const fn role(&self) -> MemberRole {
        self.role
    }

    /// Returns the invited email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Whether the invitation has been accepted.
    #[must_use]
    pub const fn invitation_accepted(&self) -> bool {
        self.invitation_accepted
    }

    /// Returns the invitation timestamp.
    #[must_use]
    pub const fn invited_at(&self) -> DateTime<Utc> {
        self.invited_at
    }

    /// Returns the invitation status.
    #[must_use]
    pub const fn status(&self) -> InvitationStatus {
        if self.invitation_accepted {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Pending
        }
    }

    /// Accepts a pending invitation on behalf of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvitationAlreadyAccepted`] when the
    /// membership is already active.
    pub fn accept(&mut self, user_id: UserId) -> Result<(), ProjectDomainError> {
        if self.invitation_accepted {
            return Err(ProjectDomainError::InvitationAlreadyAccepted(
                self.email.to_string(),
            ));
        }
        self.user_id = Some(user_id);
        self.invitation_accepted = true;
        Ok(())
    }
}
