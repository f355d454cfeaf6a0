use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::finding::Severity;

/// Broad category tier of the taxonomy (OWASP-style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    /// Natural id, e.g. "A03:injection".
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Specific weakness class (CWE-style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaknessRow {
    /// Natural id, e.g. "CWE-89".
    pub id: String,
    pub name: String,
    pub description: String,
    pub mitigation: String,
}

/// Concrete vulnerability record (CVE-style) with severity and linkage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRow {
    /// Natural id, e.g. "CVE-2021-44228".
    pub cve_id: String,
    pub summary: String,
    pub severity: Severity,
    pub cvss: f64,
    pub published_at: Option<DateTime<Utc>>,
    pub weakness_ids: Vec<String>,
}

/// A public exploit linked to a vulnerability record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploitRow {
    pub id: String,
    pub cve_id: String,
    pub title: String,
    pub source_url: String,
    /// 1 = trivial, higher = harder. "Easiest and verified" surfaces first.
    pub difficulty: u8,
    pub verified: bool,
    pub disclosed_at: Option<DateTime<Utc>>,
}

/// A historical breach case study linked to a vulnerability record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachRow {
    pub id: String,
    pub cve_id: String,
    pub organization: String,
    pub year: u16,
    /// 1 = worst. Ordering key before impact.
    pub severity_rank: u8,
    pub records_affected: i64,
    pub financial_impact_usd: i64,
    pub summary: String,
}

/// Classification of a stored code snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExampleKind {
    Vulnerable,
    Fixed,
    Exploit,
}

impl ExampleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExampleKind::Vulnerable => "vulnerable",
            ExampleKind::Fixed => "fixed",
            ExampleKind::Exploit => "exploit",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "vulnerable" => Some(ExampleKind::Vulnerable),
            "fixed" => Some(ExampleKind::Fixed),
            "exploit" => Some(ExampleKind::Exploit),
            _ => None,
        }
    }
}

/// A code-example snippet extracted from an advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeExampleRow {
    /// Advisory the snippet was extracted from (external natural id).
    pub advisory_id: String,
    pub weakness_id: String,
    pub kind: ExampleKind,
    pub language: String,
    pub content: String,
    /// blake3 of `content`; part of the dedup key.
    pub content_hash: String,
    pub ecosystem: String,
}

/// Optional filters for code-example retrieval.
#[derive(Debug, Clone, Default)]
pub struct ExampleFilter {
    pub language: Option<String>,
    pub kind: Option<ExampleKind>,
}
