//! Wires the session provider and repositories for one run.

use std::sync::Arc;

use humor_core::caption::CaptionRepository;
use humor_core::config::HumorConfig;
use humor_core::error::Result;
use humor_core::session::SessionProvider;
use humor_core::vote::VoteRepository;

use crate::memory::{InMemoryRecordStore, InMemorySessionProvider};
use crate::paths::HumorPaths;
use crate::storage::TokenStorage;
use crate::supabase::{
    SupabaseCaptionRepository, SupabaseClient, SupabaseSessionProvider, SupabaseVoteRepository,
};

/// The three collaborators a voting controller needs.
#[derive(Clone)]
pub struct Backend {
    pub sessions: Arc<dyn SessionProvider>,
    pub captions: Arc<dyn CaptionRepository>,
    pub votes: Arc<dyn VoteRepository>,
    /// Human-readable label for status output.
    pub label: String,
}

impl Backend {
    /// Connects to the hosted project described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `HumorError::Config` when the project URL or key is missing.
    pub async fn hosted(config: &HumorConfig, paths: &HumorPaths) -> Result<Self> {
        let client = SupabaseClient::new(&config.supabase)?;
        let storage = TokenStorage::new(paths.session_file()?);
        let sessions = SupabaseSessionProvider::new(client.clone(), storage, &config.supabase).await;

        tracing::debug!(url = %client.base_url(), "Using hosted backend");
        Ok(Self {
            label: client.base_url().to_string(),
            sessions: Arc::new(sessions),
            captions: Arc::new(SupabaseCaptionRepository::new(client.clone())),
            votes: Arc::new(SupabaseVoteRepository::new(client)),
        })
    }

    /// An in-memory backend seeded with demo captions.
    pub fn demo() -> Self {
        let store = InMemoryRecordStore::with_demo_captions();
        Self {
            label: "demo (in-memory)".to_string(),
            sessions: Arc::new(InMemorySessionProvider::new()),
            captions: Arc::new(store.clone()),
            votes: Arc::new(store),
        }
    }
}
