//! Embedding generation for the knowledge store.
//!
//! Production path: HTTP provider → retry layer → cache. When no
//! endpoint is configured the deterministic hashed provider stands in,
//! so the rest of the system never has to special-case "no embeddings".

pub mod cache;
pub mod providers;
pub mod retry;

use std::sync::Arc;

use argus_core::config::{EmbeddingConfig, IngestConfig};
use argus_core::traits::IEmbeddingProvider;
use tracing::info;

use crate::cache::CachedProvider;
use crate::providers::hashed::HashedProvider;
use crate::providers::http::HttpProvider;
use crate::retry::{RetryPolicy, RetryingProvider};

/// Assemble the provider stack from configuration.
///
/// With a credential: cache over retry over HTTP. Without one: the
/// hashed fallback, which needs neither retry nor cache.
pub fn build_provider(
    embedding: &EmbeddingConfig,
    ingest: &IngestConfig,
) -> Arc<dyn IEmbeddingProvider> {
    match embedding.api_key {
        Some(ref api_key) => {
            let http = HttpProvider::new(
                embedding.endpoint.clone(),
                api_key.clone(),
                embedding.model.clone(),
                embedding.dimensions,
                embedding.max_input_chars,
                ingest.request_timeout(),
            );
            let retrying = RetryingProvider::new(http, RetryPolicy::from_ingest(ingest));
            info!(provider = retrying.name(), "embedding provider ready");
            Arc::new(CachedProvider::new(retrying))
        }
        None => {
            info!("no embedding credential configured, using hashed fallback");
            Arc::new(HashedProvider::new(embedding.dimensions))
        }
    }
}
