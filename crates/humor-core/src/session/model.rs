//! Session domain model.

use serde::{Deserialize, Serialize};

/// An authenticated identity issued by the identity provider.
///
/// The controller only reads it. Two sessions are the same identity when
/// their `user_id` matches; tokens are not part of the domain model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque user identifier (the provider's user id)
    pub user_id: String,
    /// Display identifier, usually the email address
    pub email: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email,
        }
    }

    /// Returns a human-readable name for greetings.
    ///
    /// Falls back to the user id when the provider did not supply an email.
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.user_id)
    }

    /// Returns true when both sessions belong to the same user.
    pub fn same_user(&self, other: &Session) -> bool {
        self.user_id == other.user_id
    }
}
