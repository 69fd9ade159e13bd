//! Identifier types for the project domain.

use crate::identifier::uuid_identifier;

uuid_identifier! {
    /// Unique identifier for a project.
    ProjectId
}

uuid_identifier! {
    /// Unique identifier for a project membership row.
    MemberId
}

uuid_identifier! {
    /// Unique identifier for a project tag.
    TagId
}
