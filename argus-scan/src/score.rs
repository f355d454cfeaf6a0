//! Overall risk scoring over finding groups.
//!
//! The headline score reflects the worst few issues: the mean of the
//! top `TOP_GROUPS_FOR_SCORE` per-group risk scores, rounded. A long
//! tail of low-severity noise does not dilute it; a single outlier
//! does not dominate it when several issues are comparably dangerous.

use argus_core::constants::TOP_GROUPS_FOR_SCORE;
use argus_core::models::FindingGroup;

/// Overall scan risk in 0..=100. Zero for an empty scan.
pub fn overall_risk_score(groups: &[FindingGroup]) -> u32 {
    if groups.is_empty() {
        return 0;
    }
    let mut scores: Vec<f64> = groups.iter().map(FindingGroup::risk_score).collect();
    scores.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    scores.truncate(TOP_GROUPS_FOR_SCORE);

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.round() as u32
}

/// Groups ordered by risk score descending. Ties keep first-seen order.
pub fn by_risk_desc(groups: &[FindingGroup]) -> Vec<&FindingGroup> {
    let mut ordered: Vec<&FindingGroup> = groups.iter().collect();
    ordered.sort_by(|a, b| {
        b.risk_score()
            .partial_cmp(&a.risk_score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ordered
}
