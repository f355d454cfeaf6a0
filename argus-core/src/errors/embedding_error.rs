/// Embedding-service errors.
///
/// `TokenLimit` and `RateLimited` are transient: the retry layer
/// truncates or backs off. `CapacityExhausted` is terminal for the run.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("input exceeds provider token limit (max {max_chars} chars accepted)")]
    TokenLimit { max_chars: usize },

    #[error("embedding service rate limited")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("embedding capacity exhausted after {consecutive_failures} consecutive failures")]
    CapacityExhausted { consecutive_failures: u32 },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("provider unavailable: {provider}")]
    ProviderUnavailable { provider: String },
}
