//! Cross-reference expansion: CVE-id extraction and best-effort
//! enrichment from the knowledge store.
//!
//! Every branch here is log-and-empty. A missing record, a failed
//! exploit lookup, or an unavailable store must never abort retrieval.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use argus_core::models::{CodeExampleRow, ExampleFilter, VulnerabilityIntel};
use argus_core::traits::IKnowledgeStore;

fn cve_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)CVE-\d{4}-\d{4,}").expect("static CVE pattern"))
}

/// Extract every literal CVE id from the given texts, uppercased,
/// deduplicated in first-seen order.
pub fn extract_cve_ids<'a>(texts: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for text in texts {
        for m in cve_pattern().find_iter(text) {
            let id = m.as_str().to_uppercase();
            if seen.insert(id.clone()) {
                out.push(id);
            }
        }
    }
    out
}

/// Fetch record + exploits + breaches for each extracted CVE id.
/// Ids without a stored record are skipped silently; store failures
/// degrade the single branch with a warning.
pub fn expand_vulnerabilities(
    store: &dyn IKnowledgeStore,
    cve_ids: &[String],
) -> Vec<VulnerabilityIntel> {
    let mut out = Vec::new();
    for cve_id in cve_ids {
        let record = match store.get_vulnerability(cve_id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(cve_id, "no stored record for referenced id");
                continue;
            }
            Err(e) => {
                warn!(cve_id, error = %e, "record fetch failed, skipping");
                continue;
            }
        };
        let exploits = store.exploits_for(cve_id).unwrap_or_else(|e| {
            warn!(cve_id, error = %e, "exploit fetch failed, omitting");
            Vec::new()
        });
        let breaches = store.breaches_for(cve_id).unwrap_or_else(|e| {
            warn!(cve_id, error = %e, "breach fetch failed, omitting");
            Vec::new()
        });
        out.push(VulnerabilityIntel {
            record,
            exploits,
            breaches,
        });
    }
    out
}

/// Weakness-id union for the code-example fetch: finding weaknesses
/// plus weaknesses derived from matched records, first-seen order.
pub fn weakness_union(
    finding_weaknesses: &[String],
    vulnerabilities: &[VulnerabilityIntel],
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for id in finding_weaknesses {
        if seen.insert(id.clone()) {
            out.push(id.clone());
        }
    }
    for intel in vulnerabilities {
        for id in &intel.record.weakness_ids {
            if seen.insert(id.clone()) {
                out.push(id.clone());
            }
        }
    }
    out
}

/// Capped, filtered code-example fetch. Degrades to empty on failure.
pub fn fetch_examples(
    store: &dyn IKnowledgeStore,
    weakness_ids: &[String],
    filter: &ExampleFilter,
    cap: usize,
) -> Vec<CodeExampleRow> {
    store
        .code_examples_for(weakness_ids, filter, cap)
        .unwrap_or_else(|e| {
            warn!(error = %e, "code-example fetch failed, omitting");
            Vec::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_normalizes_cve_ids() {
        let texts = vec![
            "exploitable via cve-2021-44228 in the logging layer",
            "see CVE-2021-44228 and CVE-2014-0160 advisories",
        ];
        let ids = extract_cve_ids(texts.into_iter());
        assert_eq!(ids, vec!["CVE-2021-44228", "CVE-2014-0160"]);
    }

    #[test]
    fn ignores_near_misses() {
        let ids = extract_cve_ids(["CVE-21-1234", "CVE-2021-123", "CVEX-2021-44228"].into_iter());
        assert!(ids.is_empty());
    }

    #[test]
    fn union_keeps_first_seen_order() {
        use argus_core::models::{Severity, VulnerabilityRow};
        let intel = VulnerabilityIntel {
            record: VulnerabilityRow {
                cve_id: "CVE-2024-1".to_string(),
                summary: String::new(),
                severity: Severity::High,
                cvss: 8.0,
                published_at: None,
                weakness_ids: vec!["CWE-79".to_string(), "CWE-89".to_string()],
            },
            exploits: Vec::new(),
            breaches: Vec::new(),
        };
        let union = weakness_union(&["CWE-89".to_string(), "CWE-22".to_string()], &[intel]);
        assert_eq!(union, vec!["CWE-89", "CWE-22", "CWE-79"]);
    }
}
