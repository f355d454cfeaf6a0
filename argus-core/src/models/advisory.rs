use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One advisory as returned by the external feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisory {
    /// Feed-assigned natural id, e.g. "GHSA-jfh8-c2jp-5v3q".
    pub id: String,
    pub summary: String,
    /// Markdown body; code examples are extracted from fenced blocks here.
    pub description: String,
    pub severity: String,
    pub ecosystem: String,
    #[serde(default)]
    pub cve_ids: Vec<String>,
    /// CWE ids referenced by the advisory.
    #[serde(default)]
    pub weakness_ids: Vec<String>,
    #[serde(default)]
    pub cvss: Option<f64>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Advisory {
    /// Whether the advisory references at least one priority weakness.
    pub fn references_any(&self, priority_weaknesses: &[String]) -> bool {
        self.weakness_ids
            .iter()
            .any(|w| priority_weaknesses.iter().any(|p| p == w))
    }
}

/// One page of advisories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryPage {
    pub advisories: Vec<Advisory>,
    pub page: u32,
    /// Page size that was requested; fewer returned rows means the
    /// partition is exhausted.
    pub requested_size: usize,
}

impl AdvisoryPage {
    /// Short page ⇒ end of data for this partition.
    pub fn is_last(&self) -> bool {
        self.advisories.is_empty() || self.advisories.len() < self.requested_size
    }
}
