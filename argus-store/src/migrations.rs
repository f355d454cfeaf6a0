//! Schema migrations, tracked via `user_version`.

use rusqlite::Connection;

use argus_core::errors::{ArgusResult, StoreError};

const CURRENT_VERSION: u32 = 1;

/// Bring the database up to the current schema version.
pub fn run_migrations(conn: &Connection) -> ArgusResult<()> {
    let version: u32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| migration_err(0, e.to_string()))?;

    if version < 1 {
        v001_knowledge_tables(conn)?;
        conn.pragma_update(None, "user_version", CURRENT_VERSION)
            .map_err(|e| migration_err(1, e.to_string()))?;
    }
    Ok(())
}

fn migration_err(version: u32, reason: String) -> argus_core::errors::ArgusError {
    StoreError::MigrationFailed { version, reason }.into()
}

/// v001: taxonomy catalogs, vulnerability linkage, code examples,
/// ingestion state.
fn v001_knowledge_tables(conn: &Connection) -> ArgusResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS categories (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            description TEXT NOT NULL,
            embedding   BLOB NOT NULL,
            dimensions  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS weaknesses (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            description TEXT NOT NULL,
            mitigation  TEXT NOT NULL DEFAULT '',
            embedding   BLOB NOT NULL,
            dimensions  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS vulnerabilities (
            cve_id       TEXT PRIMARY KEY,
            summary      TEXT NOT NULL,
            severity     TEXT NOT NULL,
            cvss         REAL NOT NULL DEFAULT 0,
            published_at TEXT,
            weakness_ids TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS exploits (
            id           TEXT PRIMARY KEY,
            cve_id       TEXT NOT NULL,
            title        TEXT NOT NULL,
            source_url   TEXT NOT NULL,
            difficulty   INTEGER NOT NULL,
            verified     INTEGER NOT NULL DEFAULT 0,
            disclosed_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_exploits_cve ON exploits(cve_id);

        CREATE TABLE IF NOT EXISTS breaches (
            id                   TEXT PRIMARY KEY,
            cve_id               TEXT NOT NULL,
            organization         TEXT NOT NULL,
            year                 INTEGER NOT NULL,
            severity_rank        INTEGER NOT NULL,
            records_affected     INTEGER NOT NULL DEFAULT 0,
            financial_impact_usd INTEGER NOT NULL DEFAULT 0,
            summary              TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_breaches_cve ON breaches(cve_id);

        CREATE TABLE IF NOT EXISTS code_examples (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            advisory_id  TEXT NOT NULL,
            weakness_id  TEXT NOT NULL,
            kind         TEXT NOT NULL,
            language     TEXT NOT NULL,
            content      TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            ecosystem    TEXT NOT NULL,
            embedding    BLOB NOT NULL,
            dimensions   INTEGER NOT NULL,
            UNIQUE(advisory_id, weakness_id, content_hash)
        );
        CREATE INDEX IF NOT EXISTS idx_examples_weakness ON code_examples(weakness_id);

        CREATE TABLE IF NOT EXISTS ingest_state (
            source         TEXT NOT NULL,
            ecosystem      TEXT NOT NULL,
            severity       TEXT NOT NULL,
            last_page      INTEGER NOT NULL DEFAULT 0,
            total_fetched  INTEGER NOT NULL DEFAULT 0,
            total_inserted INTEGER NOT NULL DEFAULT 0,
            exhausted      INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (source, ecosystem, severity)
        );
        ",
    )
    .map_err(|e| migration_err(1, e.to_string()))?;
    Ok(())
}
