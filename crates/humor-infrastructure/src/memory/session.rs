use async_trait::async_trait;
use humor_core::error::{HumorError, Result};
use humor_core::session::{
    AuthCallback, Session, SessionBroadcaster, SessionChange, SessionProvider,
    SessionSubscription, SignInFlow,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const DEMO_USER_EMAIL: &str = "demo@humor.study";

/// Who `sign_in` signs in.
#[derive(Clone)]
enum Identity {
    /// The same account every time.
    Fixed(Session),
    /// A new demo account per sign-in, so earlier votes never collide.
    PerSignIn,
}

/// Session provider that signs in a demo user without a browser.
#[derive(Clone)]
pub struct InMemorySessionProvider {
    current: Arc<RwLock<Option<Session>>>,
    broadcaster: SessionBroadcaster,
    identity: Identity,
}

impl InMemorySessionProvider {
    /// Signs in a fresh demo user on every sign-in.
    pub fn new() -> Self {
        Self::with_identity(Identity::PerSignIn)
    }

    /// Uses `user` as the account `sign_in` signs in.
    pub fn with_user(user: Session) -> Self {
        Self::with_identity(Identity::Fixed(user))
    }

    fn with_identity(identity: Identity) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            broadcaster: SessionBroadcaster::new(),
            identity,
        }
    }

    fn next_user(&self) -> Session {
        match &self.identity {
            Identity::Fixed(user) => user.clone(),
            Identity::PerSignIn => Session::new(
                format!("demo-{}", Uuid::new_v4()),
                Some(DEMO_USER_EMAIL.to_string()),
            ),
        }
    }

    async fn establish(&self, session: Session) {
        *self.current.write().await = Some(session.clone());
        tracing::info!(user_id = %session.user_id, "Demo user signed in");
        self.broadcaster.publish(SessionChange::signed_in(session));
    }
}

impl Default for InMemorySessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.current.read().await.clone())
    }

    fn subscribe(&self) -> SessionSubscription {
        self.broadcaster.subscribe()
    }

    async fn sign_in(&self) -> Result<SignInFlow> {
        let session = self.next_user();
        self.establish(session.clone()).await;
        Ok(SignInFlow::Completed { session })
    }

    /// Accepts any non-empty access token as a demo user.
    async fn complete_sign_in(&self, callback: AuthCallback) -> Result<Session> {
        if callback.access_token.trim().is_empty() {
            return Err(HumorError::provider("Callback did not include an access token"));
        }
        let session = self.next_user();
        self.establish(session.clone()).await;
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        *self.current.write().await = None;
        self.broadcaster.publish(SessionChange::signed_out());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use humor_core::session::AuthChangeEvent;

    #[tokio::test]
    async fn test_sign_in_and_out_are_published() {
        let provider = InMemorySessionProvider::new();
        let mut subscription = provider.subscribe();
        assert_eq!(provider.current_session().await.unwrap(), None);

        let flow = provider.sign_in().await.unwrap();
        assert!(matches!(flow, SignInFlow::Completed { .. }));
        let change = subscription.recv().await.unwrap();
        assert_eq!(change.event, AuthChangeEvent::SignedIn);
        assert!(change.session.unwrap().user_id.starts_with("demo-"));

        provider.sign_out().await.unwrap();
        let change = subscription.recv().await.unwrap();
        assert!(change.is_session_lost());
        assert_eq!(provider.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_complete_sign_in_requires_token() {
        let provider = InMemorySessionProvider::new();
        let err = provider
            .complete_sign_in(AuthCallback {
                access_token: String::new(),
                refresh_token: String::new(),
            })
            .await
            .unwrap_err();
        assert!(err.is_provider());

        let session = provider
            .complete_sign_in(AuthCallback {
                access_token: "anything".to_string(),
                refresh_token: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(session.email.as_deref(), Some(DEMO_USER_EMAIL));
    }

    #[tokio::test]
    async fn test_each_sign_in_is_a_new_demo_user() {
        let provider = InMemorySessionProvider::new();

        let SignInFlow::Completed { session: first } = provider.sign_in().await.unwrap() else {
            panic!("expected an immediate sign-in");
        };
        provider.sign_out().await.unwrap();
        let SignInFlow::Completed { session: second } = provider.sign_in().await.unwrap() else {
            panic!("expected an immediate sign-in");
        };

        assert!(!first.same_user(&second));
        assert_eq!(provider.current_session().await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_fixed_user_signs_in_every_time() {
        let ada = Session::new("user-ada", None);
        let provider = InMemorySessionProvider::with_user(ada.clone());

        provider.sign_in().await.unwrap();
        provider.sign_out().await.unwrap();
        provider.sign_in().await.unwrap();

        assert_eq!(provider.current_session().await.unwrap(), Some(ada));
    }
}
