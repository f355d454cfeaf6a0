//! Pagination-state rows: single-row atomic upserts per partition.

use rusqlite::{params, Connection};

use argus_core::errors::ArgusResult;
use argus_core::models::{PartitionKey, PartitionState};

use crate::to_store_err;

pub fn load_partition(
    conn: &Connection,
    key: &PartitionKey,
) -> ArgusResult<Option<PartitionState>> {
    let mut stmt = conn
        .prepare(
            "SELECT last_page, total_fetched, total_inserted, exhausted
             FROM ingest_state WHERE source = ?1 AND ecosystem = ?2 AND severity = ?3",
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    let mut rows = stmt
        .query(params![key.source, key.ecosystem, key.severity])
        .map_err(|e| to_store_err(e.to_string()))?;

    match rows.next().map_err(|e| to_store_err(e.to_string()))? {
        Some(row) => Ok(Some(PartitionState {
            last_page: row.get(0).map_err(|e| to_store_err(e.to_string()))?,
            total_fetched: row.get(1).map_err(|e| to_store_err(e.to_string()))?,
            total_inserted: row.get(2).map_err(|e| to_store_err(e.to_string()))?,
            exhausted: row
                .get::<_, i32>(3)
                .map_err(|e| to_store_err(e.to_string()))?
                != 0,
        })),
        None => Ok(None),
    }
}

/// Atomic upsert of a partition's full progress row. The driving loop
/// processes partitions one at a time, so no two writers ever race on
/// the same key.
pub fn save_partition(
    conn: &Connection,
    key: &PartitionKey,
    state: &PartitionState,
) -> ArgusResult<()> {
    conn.execute(
        "INSERT INTO ingest_state
            (source, ecosystem, severity, last_page, total_fetched, total_inserted, exhausted)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(source, ecosystem, severity) DO UPDATE SET
            last_page = excluded.last_page,
            total_fetched = excluded.total_fetched,
            total_inserted = excluded.total_inserted,
            exhausted = excluded.exhausted",
        params![
            key.source,
            key.ecosystem,
            key.severity,
            state.last_page,
            state.total_fetched,
            state.total_inserted,
            state.exhausted as i32,
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

/// Explicit reset: drop all rows for a source, returning them to fresh.
pub fn reset_partitions(conn: &Connection, source: &str) -> ArgusResult<usize> {
    conn.execute("DELETE FROM ingest_state WHERE source = ?1", params![source])
        .map_err(|e| to_store_err(e.to_string()))
}

pub fn list_partitions(
    conn: &Connection,
    source: &str,
) -> ArgusResult<Vec<(PartitionKey, PartitionState)>> {
    let mut stmt = conn
        .prepare(
            "SELECT ecosystem, severity, last_page, total_fetched, total_inserted, exhausted
             FROM ingest_state WHERE source = ?1 ORDER BY ecosystem, severity",
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![source], |row| {
            Ok((
                PartitionKey {
                    source: source.to_string(),
                    ecosystem: row.get(0)?,
                    severity: row.get(1)?,
                },
                PartitionState {
                    last_page: row.get(2)?,
                    total_fetched: row.get(3)?,
                    total_inserted: row.get(4)?,
                    exhausted: row.get::<_, i32>(5)? != 0,
                },
            ))
        })
        .map_err(|e| to_store_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_store_err(e.to_string()))
}
