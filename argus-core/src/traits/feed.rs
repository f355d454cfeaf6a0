use async_trait::async_trait;

use crate::errors::ArgusResult;
use crate::models::AdvisoryPage;

/// Paginated advisory feed, partitioned by ecosystem × severity.
#[async_trait]
pub trait IAdvisoryFeed: Send + Sync {
    /// Fetch one page (1-based). A page shorter than `page_size` marks
    /// the end of data for the partition.
    async fn fetch_page(
        &self,
        ecosystem: &str,
        severity: &str,
        page: u32,
        page_size: usize,
    ) -> ArgusResult<AdvisoryPage>;

    /// Feed source name, used in partition keys.
    fn source(&self) -> &str;
}
