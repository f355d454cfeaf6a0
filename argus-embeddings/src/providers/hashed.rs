//! Deterministic hashed-token fallback provider.
//!
//! Buckets tokens into a fixed-dimension vector weighted by frequency.
//! Far weaker than a neural embedding, but deterministic, offline, and
//! good enough to keep similarity search functional without a service.

use std::collections::HashMap;

use async_trait::async_trait;

use argus_core::errors::ArgusResult;
use argus_core::traits::IEmbeddingProvider;

pub struct HashedProvider {
    dimensions: usize,
}

impl HashedProvider {
    pub fn new(dimensions: usize) -> Self {
        HashedProvider { dimensions }
    }

    fn bucket(token: &str, dims: usize) -> usize {
        let digest = blake3::hash(token.as_bytes());
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&digest.as_bytes()[..8]);
        (u64::from_le_bytes(raw) as usize) % dims
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_' && c != '-')
            .filter(|t| t.len() >= 2)
            .map(str::to_lowercase)
            .collect()
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return vec![0.0; self.dimensions];
        }

        let mut counts: HashMap<&str, f32> = HashMap::new();
        for token in &tokens {
            *counts.entry(token.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        let mut out = vec![0.0f32; self.dimensions];
        for (token, count) in counts {
            // Longer tokens carry more signal than short common ones.
            let weight = (count / total) * (1.0 + (token.len() as f32).ln());
            out[Self::bucket(token, self.dimensions)] += weight;
        }

        let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut out {
                *v /= norm;
            }
        }
        out
    }
}

#[async_trait]
impl IEmbeddingProvider for HashedProvider {
    async fn embed(&self, text: &str) -> ArgusResult<Vec<f32>> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> ArgusResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashed-fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deterministic_and_normalized() {
        let provider = HashedProvider::new(64);
        let a = provider.embed("sql injection in login form").await.unwrap();
        let b = provider.embed("sql injection in login form").await.unwrap();
        assert_eq!(a, b);

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn related_texts_score_higher_than_unrelated() {
        let provider = HashedProvider::new(256);
        let query = provider.embed("sql injection parameterized query").await.unwrap();
        let related = provider
            .embed("injection via sql string concatenation, use parameterized statements")
            .await
            .unwrap();
        let unrelated = provider
            .embed("certificate expiry monitoring dashboard widget")
            .await
            .unwrap();

        let dot = |x: &[f32], y: &[f32]| -> f32 { x.iter().zip(y).map(|(a, b)| a * b).sum() };
        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let provider = HashedProvider::new(16);
        let v = provider.embed("").await.unwrap();
        assert_eq!(v, vec![0.0; 16]);
    }
}
