//! Port contracts for the authentication provider.

pub mod provider;

pub use provider::{IdentityError, IdentityProvider, IdentityResult};
