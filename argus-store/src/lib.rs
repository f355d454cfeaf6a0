//! # argus-store
//!
//! SQLite persistence for the knowledge store: category/weakness
//! catalogs, vulnerability records with exploit and breach linkage,
//! embedded code examples, and the ingestion pagination state.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod vectors;

pub use engine::StoreEngine;

use argus_core::errors::{ArgusError, StoreError};

/// Shorthand for wrapping rusqlite failures into the store error kind.
pub(crate) fn to_store_err(message: impl Into<String>) -> ArgusError {
    StoreError::Sqlite {
        message: message.into(),
    }
    .into()
}
