//! Domain models: scan input, derived groups, knowledge rows,
//! retrieval results, and ingestion state.

mod advisory;
mod context;
mod finding;
mod group;
mod ingest_state;
mod knowledge;
mod retrieved;
mod summary;

pub use advisory::{Advisory, AdvisoryPage};
pub use context::{IntelContext, VulnerabilityIntel};
pub use finding::{Finding, RawFinding, RawScan, Severity};
pub use group::FindingGroup;
pub use ingest_state::{IngestReport, PartitionKey, PartitionProgress, PartitionState};
pub use knowledge::{
    BreachRow, CategoryRow, CodeExampleRow, ExampleFilter, ExampleKind, ExploitRow,
    VulnerabilityRow, WeaknessRow,
};
pub use retrieved::{RetrievedItem, SourceRecord};
pub use summary::ScanSummary;
