//! Retry layer over an embedding provider.
//!
//! Token-limit failures truncate the input and retry once. Rate limits
//! back off exponentially, honoring a server-provided delay when one is
//! present. A run of consecutive failures past the configured threshold
//! converts into the terminal capacity error.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use argus_core::config::IngestConfig;
use argus_core::errors::{ArgusError, ArgusResult, EmbeddingError};
use argus_core::traits::IEmbeddingProvider;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub max_consecutive_failures: u32,
}

impl RetryPolicy {
    pub fn from_ingest(config: &IngestConfig) -> Self {
        RetryPolicy {
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            max_consecutive_failures: config.max_consecutive_failures,
        }
    }

    /// Exponential backoff for the nth consecutive failure, capped.
    pub fn backoff_for(&self, failures: u32) -> Duration {
        let exp = failures.min(16);
        let raw = self.base_backoff.saturating_mul(1u32 << exp.min(31));
        raw.min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from_ingest(&IngestConfig::default())
    }
}

/// Wraps a provider with truncate-and-retry, backoff, and the
/// consecutive-failure circuit breaker. The counter persists across
/// calls: success anywhere resets it.
pub struct RetryingProvider<P: IEmbeddingProvider> {
    inner: P,
    policy: RetryPolicy,
    consecutive_failures: AtomicU32,
}

impl<P: IEmbeddingProvider> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        RetryingProvider {
            inner,
            policy,
            consecutive_failures: AtomicU32::new(0),
        }
    }

    /// Record one failure; the terminal error once the threshold trips.
    fn record_failure(&self) -> Option<ArgusError> {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        if failures >= self.policy.max_consecutive_failures {
            Some(
                EmbeddingError::CapacityExhausted {
                    consecutive_failures: failures,
                }
                .into(),
            )
        } else {
            None
        }
    }

    fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
    }

    async fn wait(&self, retry_after_ms: Option<u64>) {
        let failures = self.consecutive_failures.load(Ordering::SeqCst);
        let delay = match retry_after_ms {
            Some(ms) => Duration::from_millis(ms).min(self.policy.max_backoff),
            None => self.policy.backoff_for(failures),
        };
        warn!(delay_ms = delay.as_millis() as u64, "rate limited, backing off");
        tokio::time::sleep(delay).await;
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[async_trait]
impl<P: IEmbeddingProvider> IEmbeddingProvider for RetryingProvider<P> {
    async fn embed(&self, text: &str) -> ArgusResult<Vec<f32>> {
        let mut input = text.to_string();
        let mut truncated = false;
        loop {
            match self.inner.embed(&input).await {
                Ok(vector) => {
                    self.record_success();
                    return Ok(vector);
                }
                Err(ArgusError::Embedding(EmbeddingError::TokenLimit { max_chars }))
                    if !truncated =>
                {
                    warn!(max_chars, "input over token limit, truncating and retrying");
                    input = truncate_chars(&input, max_chars);
                    truncated = true;
                }
                Err(ArgusError::Embedding(EmbeddingError::RateLimited { retry_after_ms })) => {
                    if let Some(fatal) = self.record_failure() {
                        return Err(fatal);
                    }
                    self.wait(retry_after_ms).await;
                }
                Err(other) => {
                    if let Some(fatal) = self.record_failure() {
                        return Err(fatal);
                    }
                    return Err(other);
                }
            }
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> ArgusResult<Vec<Vec<f32>>> {
        let mut inputs: Vec<String> = texts.to_vec();
        let mut truncated = false;
        loop {
            match self.inner.embed_batch(&inputs).await {
                Ok(vectors) => {
                    self.record_success();
                    return Ok(vectors);
                }
                Err(ArgusError::Embedding(EmbeddingError::TokenLimit { max_chars }))
                    if !truncated =>
                {
                    warn!(max_chars, "batch over token limit, truncating and retrying");
                    for input in &mut inputs {
                        *input = truncate_chars(input, max_chars);
                    }
                    truncated = true;
                }
                Err(ArgusError::Embedding(EmbeddingError::RateLimited { retry_after_ms })) => {
                    if let Some(fatal) = self.record_failure() {
                        return Err(fatal);
                    }
                    self.wait(retry_after_ms).await;
                }
                Err(other) => {
                    if let Some(fatal) = self.record_failure() {
                        return Err(fatal);
                    }
                    return Err(other);
                }
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted provider: pops one response per call.
    struct Scripted {
        responses: Mutex<Vec<Result<Vec<f32>, EmbeddingError>>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(mut responses: Vec<Result<Vec<f32>, EmbeddingError>>) -> Self {
            responses.reverse();
            Scripted {
                responses: Mutex::new(responses),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IEmbeddingProvider for Scripted {
        async fn embed(&self, _text: &str) -> ArgusResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Ok(vec![0.0]))
                .map_err(Into::into)
        }

        async fn embed_batch(&self, texts: &[String]) -> ArgusResult<Vec<Vec<f32>>> {
            let one = self.embed(&texts[0]).await?;
            Ok(vec![one; texts.len()])
        }

        fn dimensions(&self) -> usize {
            1
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            max_consecutive_failures: 3,
        }
    }

    #[tokio::test]
    async fn token_limit_truncates_and_retries_once() {
        let inner = Scripted::new(vec![
            Err(EmbeddingError::TokenLimit { max_chars: 4 }),
            Ok(vec![1.0]),
        ]);
        let provider = RetryingProvider::new(inner, fast_policy());
        let out = provider.embed("abcdefgh").await.unwrap();
        assert_eq!(out, vec![1.0]);
        assert_eq!(provider.inner.calls(), 2);
    }

    #[tokio::test]
    async fn rate_limit_backs_off_then_succeeds() {
        let inner = Scripted::new(vec![
            Err(EmbeddingError::RateLimited {
                retry_after_ms: Some(1),
            }),
            Err(EmbeddingError::RateLimited {
                retry_after_ms: None,
            }),
            Ok(vec![2.0]),
        ]);
        let provider = RetryingProvider::new(inner, fast_policy());
        let out = provider.embed("text").await.unwrap();
        assert_eq!(out, vec![2.0]);
        assert_eq!(provider.inner.calls(), 3);
    }

    #[tokio::test]
    async fn sustained_rate_limiting_trips_the_breaker() {
        let inner = Scripted::new(vec![
            Err(EmbeddingError::RateLimited {
                retry_after_ms: Some(1),
            }),
            Err(EmbeddingError::RateLimited {
                retry_after_ms: Some(1),
            }),
            Err(EmbeddingError::RateLimited {
                retry_after_ms: Some(1),
            }),
        ]);
        let provider = RetryingProvider::new(inner, fast_policy());
        let err = provider.embed("text").await.unwrap_err();
        assert!(err.is_fatal_capacity());
    }

    #[tokio::test]
    async fn success_resets_the_failure_counter() {
        let inner = Scripted::new(vec![
            Err(EmbeddingError::RateLimited {
                retry_after_ms: Some(1),
            }),
            Err(EmbeddingError::RateLimited {
                retry_after_ms: Some(1),
            }),
            Ok(vec![1.0]),
            Err(EmbeddingError::RateLimited {
                retry_after_ms: Some(1),
            }),
            Err(EmbeddingError::RateLimited {
                retry_after_ms: Some(1),
            }),
            Ok(vec![2.0]),
        ]);
        let provider = RetryingProvider::new(inner, fast_policy());
        assert_eq!(provider.embed("a").await.unwrap(), vec![1.0]);
        assert_eq!(provider.embed("b").await.unwrap(), vec![2.0]);
    }

    #[tokio::test]
    async fn hard_failure_propagates_without_retry() {
        let inner = Scripted::new(vec![Err(EmbeddingError::RequestFailed {
            reason: "boom".to_string(),
        })]);
        let provider = RetryingProvider::new(inner, fast_policy());
        let err = provider.embed("text").await.unwrap_err();
        assert!(matches!(
            err,
            ArgusError::Embedding(EmbeddingError::RequestFailed { .. })
        ));
        assert_eq!(provider.inner.calls(), 1);
    }
}
