//! StoreEngine owns the connection pool, runs migrations on open, and
//! implements IKnowledgeStore.

use std::path::Path;

use argus_core::errors::ArgusResult;
use argus_core::models::{
    BreachRow, CategoryRow, CodeExampleRow, ExampleFilter, ExploitRow, PartitionKey,
    PartitionState, VulnerabilityRow, WeaknessRow,
};
use argus_core::traits::IKnowledgeStore;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{example_ops, ingest_ops, taxonomy_ops, vuln_ops};
use crate::to_store_err;

/// The knowledge store engine. Construct once per process, share by
/// reference, drop on shutdown. Never a module-level singleton.
pub struct StoreEngine {
    pool: ConnectionPool,
}

impl StoreEngine {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path) -> ArgusResult<Self> {
        let pool = ConnectionPool::open(path)?;
        let engine = StoreEngine { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> ArgusResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        let engine = StoreEngine { pool };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> ArgusResult<()> {
        self.pool.with_conn(migrations::run_migrations)
    }
}

impl IKnowledgeStore for StoreEngine {
    fn upsert_category(&self, row: &CategoryRow, embedding: &[f32]) -> ArgusResult<()> {
        self.pool
            .with_conn(|conn| taxonomy_ops::upsert_category(conn, row, embedding))
    }

    fn upsert_weakness(&self, row: &WeaknessRow, embedding: &[f32]) -> ArgusResult<()> {
        self.pool
            .with_conn(|conn| taxonomy_ops::upsert_weakness(conn, row, embedding))
    }

    fn upsert_vulnerability(&self, row: &VulnerabilityRow) -> ArgusResult<()> {
        self.pool
            .with_conn(|conn| vuln_ops::upsert_vulnerability(conn, row))
    }

    fn upsert_exploit(&self, row: &ExploitRow) -> ArgusResult<()> {
        self.pool.with_conn(|conn| vuln_ops::upsert_exploit(conn, row))
    }

    fn upsert_breach(&self, row: &BreachRow) -> ArgusResult<()> {
        self.pool.with_conn(|conn| vuln_ops::upsert_breach(conn, row))
    }

    fn insert_code_example(&self, row: &CodeExampleRow, embedding: &[f32]) -> ArgusResult<bool> {
        self.pool
            .with_conn(|conn| example_ops::insert_code_example(conn, row, embedding))
    }

    fn search_categories(
        &self,
        embedding: &[f32],
        ids: &[String],
        top_k: usize,
    ) -> ArgusResult<Vec<(CategoryRow, f64)>> {
        self.pool
            .with_conn(|conn| taxonomy_ops::search_categories(conn, embedding, ids, top_k))
    }

    fn search_weaknesses(
        &self,
        embedding: &[f32],
        ids: &[String],
        top_k: usize,
    ) -> ArgusResult<Vec<(WeaknessRow, f64)>> {
        self.pool
            .with_conn(|conn| taxonomy_ops::search_weaknesses(conn, embedding, ids, top_k))
    }

    fn get_vulnerability(&self, cve_id: &str) -> ArgusResult<Option<VulnerabilityRow>> {
        self.pool
            .with_conn(|conn| vuln_ops::get_vulnerability(conn, cve_id))
    }

    fn exploits_for(&self, cve_id: &str) -> ArgusResult<Vec<ExploitRow>> {
        self.pool.with_conn(|conn| vuln_ops::exploits_for(conn, cve_id))
    }

    fn breaches_for(&self, cve_id: &str) -> ArgusResult<Vec<BreachRow>> {
        self.pool.with_conn(|conn| vuln_ops::breaches_for(conn, cve_id))
    }

    fn code_examples_for(
        &self,
        weakness_ids: &[String],
        filter: &ExampleFilter,
        cap: usize,
    ) -> ArgusResult<Vec<CodeExampleRow>> {
        self.pool
            .with_conn(|conn| example_ops::code_examples_for(conn, weakness_ids, filter, cap))
    }

    fn load_partition(&self, key: &PartitionKey) -> ArgusResult<Option<PartitionState>> {
        self.pool.with_conn(|conn| ingest_ops::load_partition(conn, key))
    }

    fn save_partition(&self, key: &PartitionKey, state: &PartitionState) -> ArgusResult<()> {
        self.pool
            .with_conn(|conn| ingest_ops::save_partition(conn, key, state))
    }

    fn reset_partitions(&self, source: &str) -> ArgusResult<usize> {
        self.pool
            .with_conn(|conn| ingest_ops::reset_partitions(conn, source))
    }

    fn list_partitions(&self, source: &str) -> ArgusResult<Vec<(PartitionKey, PartitionState)>> {
        self.pool
            .with_conn(|conn| ingest_ops::list_partitions(conn, source))
    }

    fn code_example_count(&self) -> ArgusResult<u64> {
        self.pool.with_conn(example_ops::code_example_count)
    }

    fn vacuum(&self) -> ArgusResult<()> {
        self.pool.with_conn(|conn| {
            conn.execute_batch("VACUUM")
                .map_err(|e| to_store_err(e.to_string()))
        })
    }
}
