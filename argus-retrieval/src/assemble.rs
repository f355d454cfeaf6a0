//! Flattened human-readable rendering of an assembled context.
//!
//! Blocks render in a fixed order and empty blocks are omitted rather
//! than rendered as "no data" noise.

use std::fmt::Write;

use argus_core::models::IntelContext;

pub fn render_context(context: &IntelContext) -> String {
    if context.is_empty() {
        return "no stored intelligence matched this scan\n".to_string();
    }

    let mut out = String::new();

    if !context.categories.is_empty() {
        let _ = writeln!(out, "## Categories");
        for item in &context.categories {
            let _ = writeln!(out, "- ({:.2}) {}", item.score, item.text);
        }
    }

    if !context.weaknesses.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "## Weaknesses");
        for item in &context.weaknesses {
            let _ = writeln!(out, "- ({:.2}) {}", item.score, item.text);
        }
    }

    for intel in &context.vulnerabilities {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "## {} ({}, CVSS {:.1})",
            intel.record.cve_id, intel.record.severity, intel.record.cvss
        );
        let _ = writeln!(out, "{}", intel.record.summary);
        if !intel.exploits.is_empty() {
            let _ = writeln!(out, "known exploits:");
            for exploit in &intel.exploits {
                let verified = if exploit.verified { "verified" } else { "unverified" };
                let _ = writeln!(
                    out,
                    "- {} (difficulty {}, {}) {}",
                    exploit.title, exploit.difficulty, verified, exploit.source_url
                );
            }
        }
        if !intel.breaches.is_empty() {
            let _ = writeln!(out, "breach history:");
            for breach in &intel.breaches {
                let _ = writeln!(
                    out,
                    "- {} ({}): {} records, ${}M impact",
                    breach.organization,
                    breach.year,
                    breach.records_affected,
                    breach.financial_impact_usd / 1_000_000,
                );
            }
        }
    }

    if !context.code_examples.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "## Code examples");
        for example in &context.code_examples {
            let _ = writeln!(
                out,
                "### {} example for {} ({})",
                example.kind.as_str(),
                example.weakness_id,
                example.language
            );
            let _ = writeln!(out, "```{}\n{}\n```", example.language, example.content);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::models::{CategoryRow, RetrievedItem};

    #[test]
    fn empty_context_renders_single_notice() {
        let rendered = render_context(&IntelContext::default());
        assert_eq!(rendered.lines().count(), 1);
    }

    #[test]
    fn empty_blocks_are_omitted() {
        let context = IntelContext {
            categories: vec![RetrievedItem::category(
                CategoryRow {
                    id: "A03:injection".to_string(),
                    name: "Injection".to_string(),
                    description: "user input reaches an interpreter".to_string(),
                },
                0.9,
            )],
            ..Default::default()
        };
        let rendered = render_context(&context);
        assert!(rendered.contains("## Categories"));
        assert!(!rendered.contains("## Weaknesses"));
        assert!(!rendered.contains("no data"));
    }
}
