//! Public user profile kept alongside the authentication record.

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display profile for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// User the profile belongs to.
    pub id: UserId,
    /// Optional display name.
    pub username: Option<String>,
    /// Optional avatar image URL.
    pub avatar_url: Option<String>,
    /// Whether the user administers every project.
    pub is_admin: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Returns the name to show for the user, falling back to `fallback`.
    #[must_use]
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(fallback)
    }
}
