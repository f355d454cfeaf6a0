//! Re-ranking with a deterministic fallback.

use std::cmp::Ordering;

use tracing::warn;

use argus_core::models::RetrievedItem;
use argus_core::traits::IRelevanceRanker;

/// Similarity-descending order truncated to `top_k`. The fallback
/// ordering, and the definition the ranker's output is checked against
/// in tests.
pub fn fallback_order(mut items: Vec<RetrievedItem>, top_k: usize) -> Vec<RetrievedItem> {
    items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    items.truncate(top_k);
    items
}

/// Re-rank through the relevance capability when one is wired in.
/// Any ranker failure falls back deterministically; re-ranking is an
/// enhancement, never a dependency.
pub async fn rerank_or_fallback(
    ranker: Option<&dyn IRelevanceRanker>,
    scan_digest: &str,
    items: Vec<RetrievedItem>,
    top_k: usize,
) -> Vec<RetrievedItem> {
    let Some(ranker) = ranker else {
        return fallback_order(items, top_k);
    };
    if items.is_empty() {
        return items;
    }

    match ranker.rank(scan_digest, items.clone(), top_k).await {
        Ok(ranked) => ranked,
        Err(e) => {
            warn!(error = %e, "re-ranking failed, falling back to similarity order");
            fallback_order(items, top_k)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::models::CategoryRow;

    fn item(id: &str, score: f64) -> RetrievedItem {
        RetrievedItem::category(
            CategoryRow {
                id: id.to_string(),
                name: id.to_string(),
                description: String::new(),
            },
            score,
        )
    }

    #[test]
    fn fallback_sorts_desc_and_truncates() {
        let out = fallback_order(vec![item("a", 0.2), item("b", 0.9), item("c", 0.5)], 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].score, 0.9);
        assert_eq!(out[1].score, 0.5);
    }

    #[tokio::test]
    async fn no_ranker_means_fallback() {
        let out = rerank_or_fallback(None, "digest", vec![item("a", 0.1), item("b", 0.7)], 5).await;
        assert_eq!(out[0].score, 0.7);
    }
}
