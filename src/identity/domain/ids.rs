//! Identifier types for the identity domain.

use crate::identifier::uuid_identifier;

uuid_identifier! {
    /// Identifier assigned to a user by the authentication provider.
    UserId
}
