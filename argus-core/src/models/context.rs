use serde::{Deserialize, Serialize};

use super::knowledge::{BreachRow, CodeExampleRow, ExploitRow, VulnerabilityRow};
use super::retrieved::RetrievedItem;

/// A vulnerability record expanded with its linked intelligence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityIntel {
    pub record: VulnerabilityRow,
    /// Ordered easiest-and-verified first.
    pub exploits: Vec<ExploitRow>,
    /// Ordered by severity rank, then impact.
    pub breaches: Vec<BreachRow>,
}

/// The assembled cross-referenced context for one scan.
///
/// Every collection may independently be empty: each enrichment branch
/// degrades on its own, and assembly is total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntelContext {
    pub categories: Vec<RetrievedItem>,
    pub weaknesses: Vec<RetrievedItem>,
    pub vulnerabilities: Vec<VulnerabilityIntel>,
    pub code_examples: Vec<CodeExampleRow>,
}

impl IntelContext {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.weaknesses.is_empty()
            && self.vulnerabilities.is_empty()
            && self.code_examples.is_empty()
    }
}
