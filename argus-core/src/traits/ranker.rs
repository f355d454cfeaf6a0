use async_trait::async_trait;

use crate::errors::ArgusResult;
use crate::models::RetrievedItem;

/// Relevance-scoring capability backed by a language model.
///
/// Re-ranking is a pure enhancement: callers fall back to
/// similarity-descending order on any failure.
#[async_trait]
pub trait IRelevanceRanker: Send + Sync {
    /// Reorder `items` by scan-specific usefulness and truncate to
    /// `top_k`. Returned scores are relevance judgments in [0, 1].
    async fn rank(
        &self,
        scan_digest: &str,
        items: Vec<RetrievedItem>,
        top_k: usize,
    ) -> ArgusResult<Vec<RetrievedItem>>;
}
