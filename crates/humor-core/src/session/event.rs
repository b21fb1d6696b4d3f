use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::model::Session;

/// Kind of change reported by the identity provider.
///
/// String forms follow the provider's wire names (`SIGNED_IN`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    /// First notification after subscribing, carrying the stored session (if any).
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// A session-change notification: the event kind plus the session it leaves behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

impl SessionChange {
    pub fn new(event: AuthChangeEvent, session: Option<Session>) -> Self {
        Self { event, session }
    }

    pub fn signed_in(session: Session) -> Self {
        Self::new(AuthChangeEvent::SignedIn, Some(session))
    }

    pub fn signed_out() -> Self {
        Self::new(AuthChangeEvent::SignedOut, None)
    }

    /// Returns true when the notification reports that no session remains.
    pub fn is_session_lost(&self) -> bool {
        self.session.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_event_wire_names() {
        assert_eq!(AuthChangeEvent::SignedIn.to_string(), "SIGNED_IN");
        assert_eq!(
            AuthChangeEvent::from_str("TOKEN_REFRESHED").unwrap(),
            AuthChangeEvent::TokenRefreshed
        );
    }

    #[test]
    fn test_signed_out_has_no_session() {
        assert!(SessionChange::signed_out().is_session_lost());
        assert!(!SessionChange::signed_in(Session::new("u", None)).is_session_lost());
    }
}
