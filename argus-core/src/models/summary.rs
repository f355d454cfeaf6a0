use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::finding::Severity;

/// Per-scan summary. Derived once per invocation, never persisted;
/// recomputed from the groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_findings: usize,
    pub rule_ids: Vec<String>,
    /// Severity histogram over raw findings (not groups).
    pub severity_counts: BTreeMap<Severity, usize>,
    pub distinct_endpoints: usize,
    /// Overall risk score in 0..=100.
    pub risk_score: u32,
}
