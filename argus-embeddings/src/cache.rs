//! In-memory embedding cache keyed by blake3 content hash.
//!
//! Advisory descriptions and taxonomy seeds repeat across pages and
//! runs within a process; caching saves the repeat service calls.

use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use tracing::debug;

use argus_core::errors::ArgusResult;
use argus_core::traits::IEmbeddingProvider;

const MAX_ENTRIES: u64 = 10_000;
const IDLE_TTL: Duration = Duration::from_secs(3600);

fn content_key(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// Read-through cache over any provider.
pub struct CachedProvider<P: IEmbeddingProvider> {
    inner: P,
    cache: Cache<String, Vec<f32>>,
}

impl<P: IEmbeddingProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_idle(IDLE_TTL)
            .build();
        CachedProvider { inner, cache }
    }
}

#[async_trait]
impl<P: IEmbeddingProvider> IEmbeddingProvider for CachedProvider<P> {
    async fn embed(&self, text: &str) -> ArgusResult<Vec<f32>> {
        let key = content_key(text);
        if let Some(hit) = self.cache.get(&key) {
            debug!("embedding cache hit");
            return Ok(hit);
        }
        let vector = self.inner.embed(text).await?;
        self.cache.insert(key, vector.clone());
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> ArgusResult<Vec<Vec<f32>>> {
        // Serve what we can from cache; fetch only the misses.
        let mut out: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut misses: Vec<usize> = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(&content_key(text)) {
                Some(hit) => out.push(Some(hit)),
                None => {
                    out.push(None);
                    misses.push(i);
                }
            }
        }

        if !misses.is_empty() {
            let pending: Vec<String> = misses.iter().map(|&i| texts[i].clone()).collect();
            let fetched = self.inner.embed_batch(&pending).await?;
            for (&i, vector) in misses.iter().zip(fetched) {
                self.cache.insert(content_key(&texts[i]), vector.clone());
                out[i] = Some(vector);
            }
        }

        Ok(out.into_iter().flatten().collect())
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
