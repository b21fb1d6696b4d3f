use async_trait::async_trait;
use humor_core::error::{HumorError, Result};
use humor_core::vote::{VoteRecord, VoteRepository};
use serde::Serialize;

use super::client::{SupabaseClient, ensure_success, store_error};

const VOTES_PATH: &str = "rest/v1/caption_votes";

/// Inserts votes through the REST API as the signed-in user.
#[derive(Clone)]
pub struct SupabaseVoteRepository {
    client: SupabaseClient,
}

impl SupabaseVoteRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

/// Insert payload for `caption_votes`.
#[derive(Debug, Serialize)]
struct VoteRow<'a> {
    vote_value: i64,
    profile_id: &'a str,
    caption_id: &'a str,
    created_datetime_utc: String,
}

impl<'a> From<&'a VoteRecord> for VoteRow<'a> {
    fn from(vote: &'a VoteRecord) -> Self {
        Self {
            vote_value: vote.vote_value.as_i64(),
            profile_id: &vote.profile_id,
            caption_id: &vote.caption_id,
            created_datetime_utc: vote.created_at.to_rfc3339(),
        }
    }
}

#[async_trait]
impl VoteRepository for SupabaseVoteRepository {
    async fn insert_vote(&self, vote: &VoteRecord) -> Result<()> {
        let url = self.client.endpoint(VOTES_PATH)?;
        let bearer = self.client.rest_bearer().await;

        let response = self
            .client
            .post_as(url, &bearer)
            .header("Prefer", "return=minimal")
            .json(&VoteRow::from(vote))
            .send()
            .await
            .map_err(|e| HumorError::store(format!("Vote insert failed: {}", e)))?;
        ensure_success(response, store_error).await?;

        tracing::debug!(caption_id = %vote.caption_id, "Vote inserted");
        Ok(())
    }
}
