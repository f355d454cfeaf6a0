//! Error taxonomy for the Argus workspace.
//!
//! Per-subsystem enums with struct-style variants, folded into the
//! umbrella [`ArgusError`]. Fatal-capacity conditions are distinct
//! variants so graceful-shutdown logic can tell them apart from the
//! transient failures that per-item isolation swallows.

mod embedding_error;
mod feed_error;
mod retrieval_error;
mod store_error;

pub use embedding_error::EmbeddingError;
pub use feed_error::FeedError;
pub use retrieval_error::RetrievalError;
pub use store_error::StoreError;

/// Malformed input scan. Fails fast, no partial normalization.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("finding {index}: score {value} outside [0, 10]")]
    InvalidScore { index: usize, value: f64 },

    #[error("finding {index}: unknown severity {value:?}")]
    UnknownSeverity { index: usize, value: String },

    #[error("finding {index}: empty rule id")]
    EmptyRuleId { index: usize },

    #[error("malformed scan document: {reason}")]
    MalformedScan { reason: String },
}

/// Missing or invalid configuration. Fails at startup before any work.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("store path is not configured")]
    MissingStorePath,

    #[error("missing credential: {what}")]
    MissingCredential { what: String },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse config file: {reason}")]
    Parse { reason: String },
}

/// Umbrella error for the whole workspace.
#[derive(Debug, thiserror::Error)]
pub enum ArgusError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArgusError {
    /// Sustained external-service exhaustion. The ingest loop must stop,
    /// persist progress, and terminate cleanly when it sees one of these;
    /// per-item isolation must never swallow them.
    pub fn is_fatal_capacity(&self) -> bool {
        matches!(
            self,
            ArgusError::Embedding(EmbeddingError::CapacityExhausted { .. })
                | ArgusError::Feed(FeedError::QuotaExhausted { .. })
        )
    }

    /// Retryable external failure: token-length or rate-limit signals.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ArgusError::Embedding(
                EmbeddingError::TokenLimit { .. } | EmbeddingError::RateLimited { .. }
            ) | ArgusError::Feed(FeedError::RateLimited { .. })
        )
    }
}

pub type ArgusResult<T> = Result<T, ArgusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_capacity_is_distinguishable() {
        let fatal: ArgusError = EmbeddingError::CapacityExhausted {
            consecutive_failures: 5,
        }
        .into();
        assert!(fatal.is_fatal_capacity());
        assert!(!fatal.is_transient());

        let transient: ArgusError = EmbeddingError::RateLimited {
            retry_after_ms: Some(100),
        }
        .into();
        assert!(transient.is_transient());
        assert!(!transient.is_fatal_capacity());
    }

    #[test]
    fn validation_formats_index() {
        let err = ValidationError::InvalidScore {
            index: 3,
            value: 42.0,
        };
        assert!(err.to_string().contains("finding 3"));
    }
}
