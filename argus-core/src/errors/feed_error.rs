/// Advisory-feed errors.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed request failed: {message}")]
    Http { message: String },

    #[error("failed to decode feed response: {message}")]
    Decode { message: String },

    #[error("feed rate limited")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("feed quota exhausted after {consecutive_failures} consecutive failures")]
    QuotaExhausted { consecutive_failures: u32 },
}
