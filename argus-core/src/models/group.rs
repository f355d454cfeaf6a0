use serde::{Deserialize, Serialize};

use super::finding::{Finding, Severity};
use crate::taxonomy::RuleMapping;

/// Findings deduplicated by rule id with aggregated statistics.
/// Rebuilt per scan; one group per distinct rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingGroup {
    pub rule_id: String,
    pub title: String,
    /// Number of findings folded into this group.
    pub count: usize,
    /// Running maximum of member scores.
    pub max_score: f64,
    /// True running mean of member scores.
    pub avg_score: f64,
    /// Distinct (method, endpoint) pairs seen, in first-seen order.
    pub endpoints: Vec<(String, String)>,
    /// Highest severity observed. Only ever escalates within a group.
    pub severity: Severity,
    pub category_id: String,
    pub weakness_ids: Vec<String>,
}

impl FindingGroup {
    /// Open a new group from the first finding seen for a rule,
    /// resolving its category/weakness mapping from the static table.
    pub fn open(finding: &Finding, mapping: &RuleMapping) -> Self {
        FindingGroup {
            rule_id: finding.rule_id.clone(),
            title: finding.title.clone(),
            count: 1,
            max_score: finding.score,
            avg_score: finding.score,
            endpoints: vec![(finding.method.clone(), finding.endpoint.clone())],
            severity: finding.severity,
            category_id: mapping.category_id.to_string(),
            weakness_ids: mapping
                .weakness_ids
                .iter()
                .map(|w| w.to_string())
                .collect(),
        }
    }

    /// Fold a subsequent finding for the same rule into the group.
    ///
    /// `avg_score` is updated incrementally as `(avg*(n-1)+new)/n`;
    /// severity escalates iff the new finding outranks the current one.
    pub fn fold(&mut self, finding: &Finding) {
        debug_assert_eq!(self.rule_id, finding.rule_id);
        self.count += 1;
        let n = self.count as f64;
        self.avg_score = (self.avg_score * (n - 1.0) + finding.score) / n;
        if finding.score > self.max_score {
            self.max_score = finding.score;
        }
        let pair = (finding.method.clone(), finding.endpoint.clone());
        if !self.endpoints.contains(&pair) {
            self.endpoints.push(pair);
        }
        if finding.severity > self.severity {
            self.severity = finding.severity;
        }
    }

    /// Per-group risk score in [0, 100]:
    /// `min(100, weight(severity) * max_score * log10(count + 1))`.
    /// Severity and peak score dominate; frequency contributes
    /// sub-linearly.
    pub fn risk_score(&self) -> f64 {
        let raw = self.severity.weight() * self.max_score * ((self.count as f64) + 1.0).log10();
        raw.min(100.0)
    }
}
