//! Session provider backed by the hosted auth service.
//!
//! Sign-in is an OAuth redirect: `sign_in` hands back the authorize URL and
//! the tokens come back through `complete_sign_in` once the browser lands
//! on the callback page. Tokens are persisted so a restart resumes the
//! session, and refreshed shortly before they expire.

use async_trait::async_trait;
use chrono::Utc;
use humor_core::config::SupabaseSettings;
use humor_core::error::{HumorError, Result};
use humor_core::session::{
    AuthCallback, AuthChangeEvent, Session, SessionBroadcaster, SessionChange, SessionProvider,
    SessionSubscription, SignInFlow,
};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::client::{SupabaseClient, ensure_success, provider_error};
use crate::storage::{StoredSession, TokenStorage};

/// Refresh this many seconds before the access token actually expires.
const REFRESH_MARGIN_SECS: i64 = 30;

/// Lifetime assumed for tokens handed over by the callback page.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

pub struct SupabaseSessionProvider {
    client: SupabaseClient,
    storage: TokenStorage,
    broadcaster: SessionBroadcaster,
    callback_url: String,
    oauth_provider: String,
}

impl SupabaseSessionProvider {
    /// Creates the provider and restores any session saved by a previous run.
    ///
    /// An unreadable token file is logged and treated as signed out.
    pub async fn new(
        client: SupabaseClient,
        storage: TokenStorage,
        settings: &SupabaseSettings,
    ) -> Self {
        match storage.load() {
            Ok(Some(saved)) => {
                tracing::debug!(user_id = %saved.user.user_id, "Restored saved session");
                client.set_tokens(Some(saved)).await;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Ignoring unreadable session file"),
        }

        Self {
            client,
            storage,
            broadcaster: SessionBroadcaster::new(),
            callback_url: settings.auth_callback_url.clone(),
            oauth_provider: settings.oauth_provider.clone(),
        }
    }

    /// Builds `/auth/v1/authorize?provider=..&redirect_to=..`.
    fn authorize_url(&self) -> Result<Url> {
        let mut url = self.client.endpoint("auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", &self.oauth_provider)
            .append_pair("redirect_to", &self.callback_url);
        Ok(url)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<Session> {
        let url = self.client.endpoint("auth/v1/user")?;
        let response = self
            .client
            .get_as(url, access_token)
            .send()
            .await
            .map_err(|e| HumorError::provider(format!("User lookup failed: {}", e)))?;
        let response = ensure_success(response, provider_error).await?;
        let user: AuthUser = response
            .json()
            .await
            .map_err(|e| HumorError::provider(format!("Unexpected user payload: {}", e)))?;
        Ok(user.into())
    }

    /// Exchanges the refresh token. `Ok(None)` means the grant was rejected
    /// and the user has to sign in again.
    async fn refresh(&self, stored: &StoredSession) -> Result<Option<StoredSession>> {
        let mut url = self.client.endpoint("auth/v1/token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");

        let response = self
            .client
            .post_as(url, self.client.publishable_key())
            .json(&RefreshRequest {
                refresh_token: &stored.refresh_token,
            })
            .send()
            .await
            .map_err(|e| HumorError::provider(format!("Token refresh failed: {}", e)))?;

        if response.status().is_client_error() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::info!(
                error = %provider_error(status, &body),
                "Refresh token rejected; session ended"
            );
            return Ok(None);
        }

        let response = ensure_success(response, provider_error).await?;
        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|e| HumorError::provider(format!("Unexpected token payload: {}", e)))?;
        Ok(Some(grant.into_stored(stored.user.clone())))
    }

    fn persist(&self, stored: &StoredSession) {
        if let Err(e) = self.storage.save(stored) {
            tracing::warn!(error = %e, "Failed to persist session tokens");
        }
    }

    async fn forget(&self) {
        self.client.set_tokens(None).await;
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "Failed to remove session file");
        }
    }
}

#[async_trait]
impl SessionProvider for SupabaseSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        let Some(stored) = self.client.tokens().await else {
            return Ok(None);
        };
        if !stored.expires_within(REFRESH_MARGIN_SECS) {
            return Ok(Some(stored.user));
        }

        match self.refresh(&stored).await? {
            Some(renewed) => {
                let user = renewed.user.clone();
                self.persist(&renewed);
                self.client.set_tokens(Some(renewed)).await;
                self.broadcaster.publish(SessionChange::new(
                    AuthChangeEvent::TokenRefreshed,
                    Some(user.clone()),
                ));
                Ok(Some(user))
            }
            None => {
                self.forget().await;
                self.broadcaster.publish(SessionChange::signed_out());
                Ok(None)
            }
        }
    }

    fn subscribe(&self) -> SessionSubscription {
        self.broadcaster.subscribe()
    }

    async fn sign_in(&self) -> Result<SignInFlow> {
        let url = self.authorize_url()?;
        tracing::debug!(provider = %self.oauth_provider, "Starting OAuth sign-in");
        Ok(SignInFlow::Redirect {
            url: url.to_string(),
        })
    }

    async fn complete_sign_in(&self, callback: AuthCallback) -> Result<Session> {
        if callback.access_token.trim().is_empty() {
            return Err(HumorError::provider("Callback did not include an access token"));
        }

        let user = self.fetch_user(&callback.access_token).await?;
        let stored = StoredSession {
            access_token: callback.access_token,
            refresh_token: callback.refresh_token,
            expires_at: Utc::now().timestamp() + DEFAULT_TOKEN_LIFETIME_SECS,
            user: user.clone(),
        };
        self.persist(&stored);
        self.client.set_tokens(Some(stored)).await;

        tracing::info!(user_id = %user.user_id, "Signed in");
        self.broadcaster
            .publish(SessionChange::signed_in(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(stored) = self.client.tokens().await {
            let url = self.client.endpoint("auth/v1/logout")?;
            let response = self
                .client
                .post_as(url, &stored.access_token)
                .send()
                .await
                .map_err(|e| HumorError::provider(format!("Sign-out failed: {}", e)))?;
            // An already-expired token has nothing left to revoke.
            if response.status() != StatusCode::UNAUTHORIZED {
                ensure_success(response, provider_error).await?;
            }
        }

        self.forget().await;
        tracing::info!("Signed out");
        self.broadcaster.publish(SessionChange::signed_out());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<AuthUser> for Session {
    fn from(user: AuthUser) -> Self {
        Session::new(user.id, user.email.filter(|e| !e.is_empty()))
    }
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<AuthUser>,
}

impl TokenGrant {
    fn into_stored(self, fallback_user: Session) -> StoredSession {
        let expires_at = self.expires_at.unwrap_or_else(|| {
            Utc::now().timestamp() + self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
        });
        StoredSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.map(Session::from).unwrap_or(fallback_user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings() -> SupabaseSettings {
        SupabaseSettings {
            url: "https://proj.supabase.co".to_string(),
            publishable_key: "sb_publishable_key".to_string(),
            ..SupabaseSettings::default()
        }
    }

    async fn provider(dir: &TempDir) -> SupabaseSessionProvider {
        let settings = settings();
        let client = SupabaseClient::new(&settings).unwrap();
        let storage = TokenStorage::new(dir.path().join("session.json"));
        SupabaseSessionProvider::new(client, storage, &settings).await
    }

    fn stored(expires_in: i64) -> StoredSession {
        StoredSession {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now().timestamp() + expires_in,
            user: Session::new("user-1", Some("u@example.com".to_string())),
        }
    }

    #[tokio::test]
    async fn test_sign_in_returns_authorize_redirect() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir).await;

        let SignInFlow::Redirect { url } = provider.sign_in().await.unwrap() else {
            panic!("expected a redirect");
        };
        let url = Url::parse(&url).unwrap();
        assert_eq!(url.path(), "/auth/v1/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("provider".to_string(), "google".to_string())));
        assert!(pairs.contains(&(
            "redirect_to".to_string(),
            "https://thehumorproject1.vercel.app/auth/callback".to_string()
        )));
    }

    #[tokio::test]
    async fn test_no_saved_session() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir).await;
        assert_eq!(provider.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_saved_session_is_restored_without_network() {
        let dir = TempDir::new().unwrap();
        TokenStorage::new(dir.path().join("session.json"))
            .save(&stored(3600))
            .unwrap();

        let provider = provider(&dir).await;
        let session = provider.current_session().await.unwrap().unwrap();
        assert_eq!(session.user_id, "user-1");
    }

    #[tokio::test]
    async fn test_empty_callback_is_rejected() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir).await;

        let err = provider
            .complete_sign_in(AuthCallback {
                access_token: " ".to_string(),
                refresh_token: String::new(),
            })
            .await
            .unwrap_err();
        assert!(err.is_provider());
    }

    #[test]
    fn test_token_grant_prefers_absolute_expiry() {
        let grant: TokenGrant = serde_json::from_str(
            r#"{"access_token":"a2","refresh_token":"r2","expires_in":3600,"expires_at":1900000000,
                "user":{"id":"user-9","email":"n@example.com"}}"#,
        )
        .unwrap();
        let renewed = grant.into_stored(Session::new("fallback", None));

        assert_eq!(renewed.expires_at, 1_900_000_000);
        assert_eq!(renewed.user.user_id, "user-9");
    }

    #[test]
    fn test_token_grant_without_user_keeps_previous() {
        let grant: TokenGrant =
            serde_json::from_str(r#"{"access_token":"a2","refresh_token":"r2","expires_in":60}"#)
                .unwrap();
        let renewed = grant.into_stored(Session::new("user-1", None));

        assert_eq!(renewed.user.user_id, "user-1");
        assert!(renewed.expires_within(REFRESH_MARGIN_SECS + 60));
        assert!(!renewed.expires_within(0));
    }
}
