//! Error types for project validation and access control.

use super::{MemberRole, ProjectId};
use thiserror::Error;

/// Errors returned while constructing or mutating project values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project title is empty after trimming.
    #[error("project title must not be empty")]
    EmptyProjectTitle,

    /// The project title exceeds the allowed length.
    #[error("project title exceeds {max} characters")]
    ProjectTitleTooLong {
        /// Maximum number of characters.
        max: usize,
    },

    /// The tag name is empty after trimming.
    #[error("tag name must not be empty")]
    EmptyTagName,

    /// The tag color is not a `#rrggbb` hex value.
    #[error("invalid tag color '{0}', expected #rrggbb")]
    InvalidTagColor(String),

    /// Ownership cannot be granted through an invitation.
    #[error("the owner role cannot be granted by invitation")]
    OwnerRoleNotInvitable,

    /// The project owner's membership cannot be removed.
    #[error("the project owner cannot be revoked")]
    OwnerCannotBeRevoked,

    /// The invitation has already been accepted.
    #[error("invitation for {0} has already been accepted")]
    InvitationAlreadyAccepted(String),
}

/// Error returned while parsing member roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown member role: {0}")]
pub struct ParseMemberRoleError(pub String);

/// Reasons a caller may not perform an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No user is signed in.
    #[error("no active session")]
    MissingSession,

    /// The user is not an accepted member of the project.
    #[error("not a member of project {0}")]
    NotMember(ProjectId),

    /// The user's role is below the role the operation requires.
    #[error("role {actual} cannot perform an operation requiring {required}")]
    InsufficientRole {
        /// Role the operation requires.
        required: MemberRole,
        /// Role the user holds.
        actual: MemberRole,
    },

    /// The backend refused the operation for the current credentials.
    #[error("rejected by backend: {0}")]
    Rejected(String),
}
