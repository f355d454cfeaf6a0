use crate::errors::ArgusResult;
use crate::models::{
    BreachRow, CategoryRow, CodeExampleRow, ExampleFilter, ExploitRow, PartitionKey,
    PartitionState, VulnerabilityRow, WeaknessRow,
};

/// Knowledge-store contract: taxonomy/vulnerability reads, code-example
/// writes, vector-filtered similarity search, and pagination state.
///
/// The ingestion pipeline is the only writer; retrieval only reads.
pub trait IKnowledgeStore: Send + Sync {
    // --- Taxonomy upserts (seeding + ingestion) ---
    fn upsert_category(&self, row: &CategoryRow, embedding: &[f32]) -> ArgusResult<()>;
    fn upsert_weakness(&self, row: &WeaknessRow, embedding: &[f32]) -> ArgusResult<()>;
    fn upsert_vulnerability(&self, row: &VulnerabilityRow) -> ArgusResult<()>;
    fn upsert_exploit(&self, row: &ExploitRow) -> ArgusResult<()>;
    fn upsert_breach(&self, row: &BreachRow) -> ArgusResult<()>;

    /// Insert a code example and its embedding unless a row with the
    /// same (advisory id, weakness id, content hash) exists.
    /// Returns true iff a row was inserted.
    fn insert_code_example(&self, row: &CodeExampleRow, embedding: &[f32]) -> ArgusResult<bool>;

    // --- Similarity search, restricted to referenced ids ---
    fn search_categories(
        &self,
        embedding: &[f32],
        ids: &[String],
        top_k: usize,
    ) -> ArgusResult<Vec<(CategoryRow, f64)>>;
    fn search_weaknesses(
        &self,
        embedding: &[f32],
        ids: &[String],
        top_k: usize,
    ) -> ArgusResult<Vec<(WeaknessRow, f64)>>;

    // --- Cross-reference reads ---
    fn get_vulnerability(&self, cve_id: &str) -> ArgusResult<Option<VulnerabilityRow>>;
    /// Ordered by difficulty asc, verified first, most recent first.
    fn exploits_for(&self, cve_id: &str) -> ArgusResult<Vec<ExploitRow>>;
    /// Ordered by severity rank, then records affected, then cost.
    fn breaches_for(&self, cve_id: &str) -> ArgusResult<Vec<BreachRow>>;
    /// Ordered vulnerable < fixed < exploit, then language; capped.
    fn code_examples_for(
        &self,
        weakness_ids: &[String],
        filter: &ExampleFilter,
        cap: usize,
    ) -> ArgusResult<Vec<CodeExampleRow>>;

    // --- Pagination state ---
    fn load_partition(&self, key: &PartitionKey) -> ArgusResult<Option<PartitionState>>;
    /// Single-row atomic upsert of a partition's progress.
    fn save_partition(&self, key: &PartitionKey, state: &PartitionState) -> ArgusResult<()>;
    /// Clear all partitions for a source back to fresh. Returns the
    /// number of rows removed.
    fn reset_partitions(&self, source: &str) -> ArgusResult<usize>;
    fn list_partitions(&self, source: &str) -> ArgusResult<Vec<(PartitionKey, PartitionState)>>;

    // --- Maintenance ---
    fn code_example_count(&self) -> ArgusResult<u64>;
    fn vacuum(&self) -> ArgusResult<()>;
}
