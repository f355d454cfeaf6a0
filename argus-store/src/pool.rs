//! Connection handling.
//!
//! One mutex-guarded connection serves both reads and writes: the
//! workload is read-mostly with a single writing pipeline, so a
//! separate read pool would buy nothing. WAL mode keeps the file
//! usable by other processes.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;

use argus_core::errors::{ArgusResult, StoreError};

use crate::to_store_err;

/// Owns the SQLite connection and serializes access to it.
pub struct ConnectionPool {
    conn: Mutex<Connection>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a pool for the given database file.
    pub fn open(path: &Path) -> ArgusResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_store_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(ConnectionPool {
            conn: Mutex::new(conn),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory pool (for testing).
    pub fn open_in_memory() -> ArgusResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_store_err(e.to_string()))?;
        Ok(ConnectionPool {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    /// Run a closure against the connection.
    pub fn with_conn<F, T>(&self, f: F) -> ArgusResult<T>
    where
        F: FnOnce(&Connection) -> ArgusResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?;
        f(&guard)
    }
}

fn apply_pragmas(conn: &Connection) -> ArgusResult<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(|e| to_store_err(format!("pragmas: {e}")))?;
    Ok(())
}
