use serde::{Deserialize, Serialize};

use super::knowledge::{CategoryRow, CodeExampleRow, VulnerabilityRow, WeaknessRow};

/// The source row behind a retrieval result.
///
/// A tagged union over the small fixed set of row shapes, rather than
/// an open metadata map: formatting code keeps access to every source
/// field without giving up type safety.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "row")]
#[serde(rename_all = "snake_case")]
pub enum SourceRecord {
    Category(CategoryRow),
    Weakness(WeaknessRow),
    Vulnerability(VulnerabilityRow),
    CodeExample(CodeExampleRow),
}

/// One retrieval result. Produced fresh per query, never cached
/// across scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedItem {
    pub text: String,
    /// In [0, 1]. Raw cosine similarity before re-ranking; the ranker's
    /// relevance judgment after a successful re-rank.
    pub score: f64,
    pub source: SourceRecord,
}

impl RetrievedItem {
    pub fn category(row: CategoryRow, score: f64) -> Self {
        RetrievedItem {
            text: format!("{}: {}", row.name, row.description),
            score,
            source: SourceRecord::Category(row),
        }
    }

    pub fn weakness(row: WeaknessRow, score: f64) -> Self {
        RetrievedItem {
            text: format!("{} ({}): {}", row.name, row.id, row.description),
            score,
            source: SourceRecord::Weakness(row),
        }
    }
}
