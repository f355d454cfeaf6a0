//! Raw-scan validation and single-pass grouping.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use argus_core::errors::ValidationError;
use argus_core::models::{Finding, FindingGroup, RawScan, ScanSummary};
use argus_core::taxonomy;

use crate::score::overall_risk_score;

/// A validated scan: groups in first-seen rule order plus the derived
/// summary. Rebuilt per invocation, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedScan {
    pub scan_id: Option<String>,
    pub target: Option<String>,
    /// Validated findings in input order. Kept for cross-referencing;
    /// the groups are the scoring surface.
    pub findings: Vec<Finding>,
    pub groups: Vec<FindingGroup>,
    pub summary: ScanSummary,
}

impl NormalizedScan {
    /// Union of weakness ids across all groups, first-seen order.
    pub fn weakness_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for group in &self.groups {
            for id in &group.weakness_ids {
                if seen.insert(id.clone()) {
                    out.push(id.clone());
                }
            }
        }
        out
    }

    /// Distinct category ids across all groups, first-seen order.
    pub fn category_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for group in &self.groups {
            if seen.insert(group.category_id.clone()) {
                out.push(group.category_id.clone());
            }
        }
        out
    }

    /// Free-text fields a cross-reference pass should pattern-match:
    /// every finding title and description.
    pub fn reference_texts(&self) -> impl Iterator<Item = &str> {
        self.findings
            .iter()
            .flat_map(|f| [f.title.as_str(), f.description.as_str()])
    }
}

/// Normalize a raw scan document.
///
/// Validation covers the whole document before any grouping happens:
/// a single malformed finding fails the call with no partial output.
pub fn normalize(raw: &RawScan) -> Result<NormalizedScan, ValidationError> {
    for (field, value) in [("scan_id", &raw.scan_id), ("target", &raw.target)] {
        if let Some(v) = value {
            if v.trim().is_empty() {
                return Err(ValidationError::MalformedScan {
                    reason: format!("{field} is present but blank"),
                });
            }
        }
    }

    let mut findings = Vec::with_capacity(raw.findings.len());
    for (index, raw_finding) in raw.findings.iter().enumerate() {
        findings.push(Finding::validate(index, raw_finding)?);
    }

    // Single pass: group by rule id, preserving first-seen order.
    let mut groups: Vec<FindingGroup> = Vec::new();
    let mut index_by_rule: HashMap<String, usize> = HashMap::new();
    let mut severity_counts = BTreeMap::new();
    let mut endpoints = HashSet::new();

    for finding in &findings {
        *severity_counts.entry(finding.severity).or_insert(0) += 1;
        endpoints.insert((finding.method.clone(), finding.endpoint.clone()));

        match index_by_rule.get(finding.rule_id.as_str()) {
            Some(&i) => groups[i].fold(finding),
            None => {
                let mapping = taxonomy::lookup(&finding.rule_id);
                index_by_rule.insert(finding.rule_id.clone(), groups.len());
                groups.push(FindingGroup::open(finding, &mapping));
            }
        }
    }

    let summary = ScanSummary {
        total_findings: findings.len(),
        rule_ids: groups.iter().map(|g| g.rule_id.clone()).collect(),
        severity_counts,
        distinct_endpoints: endpoints.len(),
        risk_score: overall_risk_score(&groups),
    };
    debug!(
        findings = summary.total_findings,
        groups = groups.len(),
        risk = summary.risk_score,
        "scan normalized"
    );

    Ok(NormalizedScan {
        scan_id: raw.scan_id.clone(),
        target: raw.target.clone(),
        findings,
        groups,
        summary,
    })
}
