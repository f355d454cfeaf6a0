//! Query modules, one per table family.

pub mod example_ops;
pub mod ingest_ops;
pub mod taxonomy_ops;
pub mod vuln_ops;

/// Build a `?1, ?2, …` placeholder list for dynamic IN clauses.
pub(crate) fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
