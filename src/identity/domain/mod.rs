//! Domain types describing authenticated users and their profiles.

mod email;
mod error;
mod ids;
mod profile;
mod session;

pub use email::Email;
pub use error::IdentityDomainError;
pub use ids::UserId;
pub use profile::Profile;
pub use session::{Session, SessionContext};
