//! Shared HTTP plumbing for the hosted backend (auth + REST).

use std::sync::Arc;
use std::time::Duration;

use humor_core::config::SupabaseSettings;
use humor_core::error::{HumorError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::storage::StoredSession;

/// Postgres error code for unique-constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Connection to one backend project.
///
/// Holds the signed-in session's tokens so the REST repositories act as the
/// user (row-level security) while the auth provider keeps them current.
/// Cloning shares the same token slot.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    publishable_key: String,
    tokens: Arc<RwLock<Option<StoredSession>>>,
}

impl SupabaseClient {
    /// Creates a client from settings.
    ///
    /// # Errors
    ///
    /// Returns `HumorError::Config` if the URL or key is missing or the HTTP
    /// client cannot be built.
    pub fn new(settings: &SupabaseSettings) -> Result<Self> {
        if !settings.is_configured() {
            return Err(HumorError::config(
                "supabase.url and supabase.publishable_key must be set",
            ));
        }

        let mut builder = Client::builder();
        if settings.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(settings.request_timeout_secs));
        }
        let http = builder
            .build()
            .map_err(|e| HumorError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.url.trim_end_matches('/').to_string(),
            publishable_key: settings.publishable_key.clone(),
            tokens: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds `<base>/<path>` as a URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}/{}", self.base_url, path.trim_start_matches('/')))
            .map_err(|e| HumorError::config(format!("Invalid backend URL: {}", e)))
    }

    pub async fn tokens(&self) -> Option<StoredSession> {
        self.tokens.read().await.clone()
    }

    pub async fn set_tokens(&self, tokens: Option<StoredSession>) {
        *self.tokens.write().await = tokens;
    }

    /// GET with the project key and an explicit bearer token.
    pub fn get_as(&self, url: Url, bearer: &str) -> RequestBuilder {
        self.authorize(self.http.get(url), bearer)
    }

    /// POST with the project key and an explicit bearer token.
    pub fn post_as(&self, url: Url, bearer: &str) -> RequestBuilder {
        self.authorize(self.http.post(url), bearer)
    }

    /// Bearer for REST calls: the user's access token, or the project key
    /// when nobody is signed in.
    pub async fn rest_bearer(&self) -> String {
        match self.tokens.read().await.as_ref() {
            Some(tokens) => tokens.access_token.clone(),
            None => self.publishable_key.clone(),
        }
    }

    pub fn publishable_key(&self) -> &str {
        &self.publishable_key
    }

    fn authorize(&self, request: RequestBuilder, bearer: &str) -> RequestBuilder {
        request
            .header("apikey", &self.publishable_key)
            .bearer_auth(bearer)
    }
}

/// Error body returned by the REST layer.
#[derive(Debug, Default, Deserialize)]
struct RestErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Error body returned by the auth service (older and newer shapes).
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Maps a failed REST response to a store error.
pub(crate) fn store_error(status: StatusCode, body: &str) -> HumorError {
    let parsed: RestErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.details)
        .unwrap_or_else(|| fallback_message(status, body));

    if parsed.code.as_deref() == Some(UNIQUE_VIOLATION) || status == StatusCode::CONFLICT {
        HumorError::constraint(message)
    } else {
        HumorError::store(format!("{} ({})", message, status.as_u16()))
    }
}

/// Maps a failed auth response to a provider error.
pub(crate) fn provider_error(status: StatusCode, body: &str) -> HumorError {
    let parsed: AuthErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .or(parsed.error)
        .unwrap_or_else(|| fallback_message(status, body));
    HumorError::provider(format!("{} ({})", message, status.as_u16()))
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

/// Returns the response if successful, otherwise maps its body with `map`.
pub(crate) async fn ensure_success(
    response: Response,
    map: fn(StatusCode, &str) -> HumorError,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(map(status, &body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SupabaseSettings {
        SupabaseSettings {
            url: "https://proj.supabase.co/".to_string(),
            publishable_key: "sb_publishable_key".to_string(),
            ..SupabaseSettings::default()
        }
    }

    #[test]
    fn test_unconfigured_client_is_rejected() {
        let err = SupabaseClient::new(&SupabaseSettings::default()).err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = SupabaseClient::new(&settings()).unwrap();
        assert_eq!(
            client.endpoint("/rest/v1/captions").unwrap().as_str(),
            "https://proj.supabase.co/rest/v1/captions"
        );
    }

    #[tokio::test]
    async fn test_rest_bearer_prefers_user_token() {
        let client = SupabaseClient::new(&settings()).unwrap();
        assert_eq!(client.rest_bearer().await, "sb_publishable_key");

        client
            .set_tokens(Some(StoredSession {
                access_token: "user-jwt".to_string(),
                refresh_token: "r".to_string(),
                expires_at: 0,
                user: humor_core::session::Session::new("u", None),
            }))
            .await;
        assert_eq!(client.rest_bearer().await, "user-jwt");
    }

    #[test]
    fn test_unique_violation_is_constraint() {
        let body = r#"{"code":"23505","details":"Key (profile_id, caption_id) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"caption_votes_pkey\""}"#;
        let err = store_error(StatusCode::CONFLICT, body);
        assert!(err.is_constraint());
        assert!(err.message().contains("duplicate key"));
    }

    #[test]
    fn test_other_rest_failure_is_store_error() {
        let body = r#"{"code":"42P01","message":"relation \"public.captions\" does not exist"}"#;
        let err = store_error(StatusCode::NOT_FOUND, body);
        assert!(err.is_store());
        assert!(!err.is_constraint());
        assert!(err.message().contains("does not exist"));
    }

    #[test]
    fn test_auth_error_shapes() {
        let err = provider_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#,
        );
        assert!(err.is_provider());
        assert!(err.message().contains("Invalid Refresh Token"));

        let err = provider_error(StatusCode::UNAUTHORIZED, r#"{"msg":"invalid JWT"}"#);
        assert!(err.message().contains("invalid JWT"));

        let err = provider_error(StatusCode::BAD_GATEWAY, "");
        assert!(err.message().contains("Bad Gateway"));
    }
}
