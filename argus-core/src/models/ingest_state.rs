use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One (source, ecosystem, severity) pagination unit, tracked
/// independently by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub source: String,
    pub ecosystem: String,
    pub severity: String,
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.source, self.ecosystem, self.severity)
    }
}

/// Persisted pagination progress for one partition.
///
/// Created lazily on first fetch; mutated after every successful page;
/// never deleted except by explicit reset. The no-skipped-pages /
/// no-double-counted-pages property of this row is the central
/// ingestion invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionState {
    /// Last page successfully fetched and processed. 0 = fresh.
    pub last_page: u32,
    pub total_fetched: u64,
    pub total_inserted: u64,
    /// Terminal until an explicit reset.
    pub exhausted: bool,
}

impl PartitionState {
    pub fn fresh() -> Self {
        PartitionState {
            last_page: 0,
            total_fetched: 0,
            total_inserted: 0,
            exhausted: false,
        }
    }

    /// The next page to fetch for this partition.
    pub fn next_page(&self) -> u32 {
        self.last_page + 1
    }

    /// Fold one processed page into the state.
    pub fn advance(&mut self, fetched: usize, inserted: usize, exhausted: bool) {
        self.last_page += 1;
        self.total_fetched += fetched as u64;
        self.total_inserted += inserted as u64;
        self.exhausted = exhausted;
    }
}

/// Per-partition progress line for the end-of-run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionProgress {
    pub key: PartitionKey,
    pub state: PartitionState,
}

/// Ingestion statistics printed at run end so a future run resumes
/// exactly where this one left off.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub partitions: Vec<PartitionProgress>,
    pub inserted_by_ecosystem: BTreeMap<String, u64>,
    pub inserted_by_weakness: BTreeMap<String, u64>,
    pub advisories_seen: u64,
    pub advisories_relevant: u64,
    pub errors: u64,
}

impl IngestReport {
    pub fn record_insert(&mut self, ecosystem: &str, weakness_id: &str) {
        *self
            .inserted_by_ecosystem
            .entry(ecosystem.to_string())
            .or_default() += 1;
        *self
            .inserted_by_weakness
            .entry(weakness_id.to_string())
            .or_default() += 1;
    }

    /// Human-readable resume report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("ingestion progress:\n");
        for p in &self.partitions {
            out.push_str(&format!(
                "  {:<40} page {:>4}  fetched {:>6}  inserted {:>6}  {}\n",
                p.key.to_string(),
                p.state.last_page,
                p.state.total_fetched,
                p.state.total_inserted,
                if p.state.exhausted { "exhausted" } else { "resumable" },
            ));
        }
        out.push_str(&format!(
            "advisories: {} seen, {} relevant, {} errors\n",
            self.advisories_seen, self.advisories_relevant, self.errors
        ));
        if !self.inserted_by_ecosystem.is_empty() {
            out.push_str("inserted by ecosystem:\n");
            for (eco, n) in &self.inserted_by_ecosystem {
                out.push_str(&format!("  {eco:<20} {n}\n"));
            }
        }
        if !self.inserted_by_weakness.is_empty() {
            out.push_str("inserted by weakness:\n");
            for (cwe, n) in &self.inserted_by_weakness {
                out.push_str(&format!("  {cwe:<20} {n}\n"));
            }
        }
        out
    }
}
