//! Session provider trait.
//!
//! Defines the identity-provider capabilities the voting controller consumes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::model::Session;
use super::subscription::SessionSubscription;
use crate::error::Result;

/// Outcome of starting a sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignInFlow {
    /// The user must visit `url`; the session arrives later through
    /// [`SessionProvider::complete_sign_in`] and a `SignedIn` notification.
    Redirect { url: String },
    /// The provider established the session immediately.
    Completed { session: Session },
}

/// Tokens handed back to the auth callback after an external sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCallback {
    pub access_token: String,
    pub refresh_token: String,
}

/// An abstract identity provider.
///
/// Implementations publish every session change (sign-in, sign-out, refresh)
/// to their subscriptions; the controller reacts to those notifications rather
/// than to the return values of `sign_in` / `sign_out`.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Looks up the current session.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: A session is active
    /// - `Ok(None)`: Nobody is signed in
    /// - `Err(HumorError::Provider)`: The lookup itself failed
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Subscribes to session-change notifications.
    ///
    /// Dropping the returned subscription unsubscribes.
    fn subscribe(&self) -> SessionSubscription;

    /// Starts a sign-in.
    async fn sign_in(&self) -> Result<SignInFlow>;

    /// Finishes an external sign-in with the tokens delivered to the callback.
    async fn complete_sign_in(&self, callback: AuthCallback) -> Result<Session>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<()>;
}
