//! The two scan renderings: a compact embedding-oriented summary and a
//! verbose analyst report.

use std::fmt::Write;

use argus_core::constants::{ANALYST_ENDPOINT_PREVIEW, COMPACT_TOP_GROUPS};

use crate::normalize::NormalizedScan;
use crate::score::by_risk_desc;

/// Compact summary fed to the embedding service: headline numbers plus
/// the top groups by risk, one line each.
pub fn render_compact(scan: &NormalizedScan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "risk {}/100: {} findings across {} rules, {} endpoints",
        scan.summary.risk_score,
        scan.summary.total_findings,
        scan.summary.rule_ids.len(),
        scan.summary.distinct_endpoints,
    );
    for group in by_risk_desc(&scan.groups).into_iter().take(COMPACT_TOP_GROUPS) {
        let weaknesses = if group.weakness_ids.is_empty() {
            String::new()
        } else {
            format!(" [{}]", group.weakness_ids.join(", "))
        };
        let _ = writeln!(
            out,
            "{} {} ({}): {}x, max {:.1}{}",
            group.severity, group.rule_id, group.category_id, group.count, group.max_score,
            weaknesses,
        );
    }
    out
}

/// Analyst report: every group, risk descending, with endpoint lists
/// truncated past the preview cap.
pub fn render_analyst(scan: &NormalizedScan) -> String {
    let mut out = String::new();
    match scan.target {
        Some(ref target) => {
            let _ = writeln!(out, "scan of {target}");
        }
        None => {
            let _ = writeln!(out, "scan report");
        }
    }
    let _ = writeln!(
        out,
        "overall risk {}/100 ({} findings, {} rules)",
        scan.summary.risk_score,
        scan.summary.total_findings,
        scan.summary.rule_ids.len(),
    );

    for group in by_risk_desc(&scan.groups) {
        let _ = writeln!(
            out,
            "\n[{}] {} | risk {:.1}",
            group.severity.as_str().to_uppercase(),
            group.title,
            group.risk_score(),
        );
        let _ = writeln!(
            out,
            "  rule {} | category {} | {} occurrence(s), max {:.1}, avg {:.2}",
            group.rule_id, group.category_id, group.count, group.max_score, group.avg_score,
        );
        if !group.weakness_ids.is_empty() {
            let _ = writeln!(out, "  weaknesses: {}", group.weakness_ids.join(", "));
        }

        let shown = group.endpoints.iter().take(ANALYST_ENDPOINT_PREVIEW);
        let listed: Vec<String> = shown.map(|(m, e)| format!("{m} {e}")).collect();
        let rest = group.endpoints.len().saturating_sub(ANALYST_ENDPOINT_PREVIEW);
        if rest > 0 {
            let _ = writeln!(out, "  endpoints: {} (+{} more)", listed.join(", "), rest);
        } else if !listed.is_empty() {
            let _ = writeln!(out, "  endpoints: {}", listed.join(", "));
        }
    }
    out
}
