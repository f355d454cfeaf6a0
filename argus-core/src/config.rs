//! Configuration: TOML file plus environment-variable overrides.
//!
//! Precedence: defaults < config file < environment. Validation runs
//! at startup, before any work begins.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PAGE_SIZE;
use crate::errors::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path. Required for any persistent run.
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig { path: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    /// API credential; required unless the local fallback provider is used.
    pub api_key: Option<String>,
    pub model: String,
    pub dimensions: usize,
    /// Inputs longer than this are truncated before a retry on a
    /// token-length failure.
    pub max_input_chars: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig {
            endpoint: "https://api.openai.com/v1/embeddings".to_string(),
            api_key: None,
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            max_input_chars: 24_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub category_top_k: usize,
    pub weakness_top_k: usize,
    pub example_cap: usize,
    /// Whether to attempt LLM re-ranking at all.
    pub rerank: bool,
    pub language_filter: Option<String>,
    pub kind_filter: Option<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        RetrievalConfig {
            category_top_k: 8,
            weakness_top_k: 15,
            example_cap: 12,
            rerank: true,
            language_filter: None,
            kind_filter: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub feed_endpoint: String,
    pub feed_token: Option<String>,
    pub source: String,
    pub ecosystems: Vec<String>,
    pub severities: Vec<String>,
    pub page_size: usize,
    /// CWE ids an advisory must reference to be processed.
    pub priority_weaknesses: Vec<String>,
    /// Cap on simultaneously in-flight advisory tasks per page.
    pub advisory_workers: usize,
    /// Separate, smaller cap on in-flight embedding calls.
    pub embed_workers: usize,
    /// Candidate examples embedded per sub-batch within one advisory.
    pub embed_batch: usize,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Consecutive capacity failures before the run is declared fatal.
    pub max_consecutive_failures: u32,
    pub run_budget_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            feed_endpoint: "https://api.github.com/advisories".to_string(),
            feed_token: None,
            source: "ghsa".to_string(),
            ecosystems: vec!["npm".to_string(), "pip".to_string(), "cargo".to_string()],
            severities: vec!["critical".to_string(), "high".to_string()],
            page_size: DEFAULT_PAGE_SIZE,
            priority_weaknesses: vec![
                "CWE-89".to_string(),
                "CWE-79".to_string(),
                "CWE-78".to_string(),
                "CWE-22".to_string(),
                "CWE-502".to_string(),
                "CWE-918".to_string(),
            ],
            advisory_workers: 8,
            embed_workers: 2,
            embed_batch: 4,
            base_backoff_ms: 500,
            max_backoff_ms: 60_000,
            max_consecutive_failures: 5,
            run_budget_secs: 1800,
            request_timeout_secs: 30,
        }
    }
}

impl IngestConfig {
    pub fn run_budget(&self) -> Duration {
        Duration::from_secs(self.run_budget_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Top-level configuration for every Argus subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgusConfig {
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub ingest: IngestConfig,
}

impl ArgusConfig {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p).map_err(|e| ConfigError::Io {
                    path: p.display().to_string(),
                    reason: e.to_string(),
                })?;
                toml::from_str(&text).map_err(|e| ConfigError::Parse {
                    reason: e.to_string(),
                })?
            }
            None => ArgusConfig::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("ARGUS_DB_PATH") {
            self.store.path = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("ARGUS_EMBED_ENDPOINT") {
            self.embedding.endpoint = v;
        }
        if let Ok(v) = std::env::var("ARGUS_EMBED_API_KEY") {
            self.embedding.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("ARGUS_FEED_TOKEN") {
            self.ingest.feed_token = Some(v);
        }
    }

    /// Startup validation. Error kind 5: nothing runs past a failure here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.is_none() {
            return Err(ConfigError::MissingStorePath);
        }
        if self.embedding.dimensions == 0 {
            return Err(ConfigError::Invalid {
                field: "embedding.dimensions".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.ingest.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "ingest.page_size".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.ingest.advisory_workers == 0 || self.ingest.embed_workers == 0 {
            return Err(ConfigError::Invalid {
                field: "ingest.workers".to_string(),
                reason: "concurrency caps must be positive".to_string(),
            });
        }
        if self.ingest.ecosystems.is_empty() || self.ingest.severities.is_empty() {
            return Err(ConfigError::Invalid {
                field: "ingest.partitions".to_string(),
                reason: "at least one ecosystem and severity required".to_string(),
            });
        }
        Ok(())
    }
}
