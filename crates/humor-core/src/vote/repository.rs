use async_trait::async_trait;

use super::model::VoteRecord;
use crate::error::Result;

/// Insert-only access to votes in the record store.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Inserts exactly one vote record.
    ///
    /// # Errors
    ///
    /// - `HumorError::Constraint` if the store rejects a duplicate vote
    /// - `HumorError::Store` for any other write failure
    async fn insert_vote(&self, vote: &VoteRecord) -> Result<()>;
}
