//! Domain model for projects, memberships and tags.

mod error;
mod ids;
mod member;
mod project;
mod role;
mod tag;

pub use error::{AuthorizationError, ParseMemberRoleError, ProjectDomainError};
pub use ids::{MemberId, ProjectId, TagId};
pub use member::{InvitationStatus, PersistedMemberData, ProjectMember};
pub use project::{PersistedProjectData, Project};
pub use role::MemberRole;
pub use tag::{Tag, TagColor};
