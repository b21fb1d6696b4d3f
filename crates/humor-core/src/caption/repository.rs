use async_trait::async_trait;

use super::model::CaptionItem;
use crate::error::Result;

/// Read access to captions in the record store.
#[async_trait]
pub trait CaptionRepository: Send + Sync {
    /// Lists every caption whose visibility flag is public.
    ///
    /// Order is unspecified; callers that need randomness sample themselves.
    ///
    /// # Errors
    ///
    /// Returns `HumorError::Store` if the query fails.
    async fn list_public_captions(&self) -> Result<Vec<CaptionItem>>;
}
