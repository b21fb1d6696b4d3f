use async_trait::async_trait;
use humor_core::caption::{CaptionItem, CaptionRepository, ImageRef};
use humor_core::error::{HumorError, Result};
use serde::Deserialize;

use super::client::{SupabaseClient, ensure_success, store_error};

const CAPTIONS_PATH: &str = "rest/v1/captions";
const CAPTION_SELECT: &str = "id,content,is_public,like_count,images(url,image_description)";

/// Reads captions (joined with their image) through the REST API.
#[derive(Clone)]
pub struct SupabaseCaptionRepository {
    client: SupabaseClient,
}

impl SupabaseCaptionRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CaptionRepository for SupabaseCaptionRepository {
    async fn list_public_captions(&self) -> Result<Vec<CaptionItem>> {
        let mut url = self.client.endpoint(CAPTIONS_PATH)?;
        url.query_pairs_mut()
            .append_pair("select", CAPTION_SELECT)
            .append_pair("is_public", "eq.true");

        let bearer = self.client.rest_bearer().await;
        let response = self
            .client
            .get_as(url, &bearer)
            .send()
            .await
            .map_err(|e| HumorError::store(format!("Caption query failed: {}", e)))?;
        let response = ensure_success(response, store_error).await?;

        let rows: Vec<CaptionRow> = response
            .json()
            .await
            .map_err(|e| HumorError::store(format!("Unexpected caption payload: {}", e)))?;

        let captions: Vec<CaptionItem> = rows.into_iter().map(CaptionItem::from).collect();
        tracing::debug!(count = captions.len(), "Fetched public captions");
        Ok(captions)
    }
}

/// One row of `captions` with the embedded `images` relation.
#[derive(Debug, Deserialize)]
struct CaptionRow {
    id: serde_json::Value,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    is_public: Option<bool>,
    #[serde(default)]
    like_count: Option<i64>,
    #[serde(default)]
    images: Option<ImageRow>,
}

#[derive(Debug, Deserialize)]
struct ImageRow {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    image_description: Option<String>,
}

impl From<CaptionRow> for CaptionItem {
    fn from(row: CaptionRow) -> Self {
        // Ids are uuids in most deployments but bigint in some.
        let id = match row.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        let image = row.images.and_then(|img| {
            img.url.filter(|u| !u.is_empty()).map(|url| ImageRef {
                url,
                description: img.image_description,
            })
        });

        CaptionItem {
            id,
            content: row.content.unwrap_or_default(),
            image,
            // The query filters on is_public, so a missing column means public.
            is_public: row.is_public.unwrap_or(true),
            like_count: row.like_count.unwrap_or(0),
        }
    }
}
