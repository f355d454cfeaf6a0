//! Code-example inserts (dedup by content hash) and filtered retrieval.

use rusqlite::{params, params_from_iter, Connection};

use argus_core::errors::ArgusResult;
use argus_core::models::{CodeExampleRow, ExampleFilter, ExampleKind};

use crate::queries::placeholders;
use crate::to_store_err;
use crate::vectors::f32_vec_to_bytes;

/// Insert one example unless the (advisory, weakness, hash) triple
/// already exists. Skip-on-conflict makes page re-ingestion idempotent.
/// Returns true iff a row was inserted.
pub fn insert_code_example(
    conn: &Connection,
    row: &CodeExampleRow,
    embedding: &[f32],
) -> ArgusResult<bool> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO code_examples
                (advisory_id, weakness_id, kind, language, content, content_hash,
                 ecosystem, embedding, dimensions)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.advisory_id,
                row.weakness_id,
                row.kind.as_str(),
                row.language,
                row.content,
                row.content_hash,
                row.ecosystem,
                f32_vec_to_bytes(embedding),
                embedding.len() as i64,
            ],
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    Ok(changed > 0)
}

/// Examples for a weakness-id set, optionally filtered by language and
/// kind, ordered vulnerable < fixed < exploit then language, capped.
pub fn code_examples_for(
    conn: &Connection,
    weakness_ids: &[String],
    filter: &ExampleFilter,
    cap: usize,
) -> ArgusResult<Vec<CodeExampleRow>> {
    if weakness_ids.is_empty() || cap == 0 {
        return Ok(Vec::new());
    }

    let mut sql = format!(
        "SELECT advisory_id, weakness_id, kind, language, content, content_hash, ecosystem
         FROM code_examples WHERE weakness_id IN ({})",
        placeholders(weakness_ids.len())
    );
    let mut args: Vec<String> = weakness_ids.to_vec();
    if let Some(ref language) = filter.language {
        args.push(language.clone());
        sql.push_str(&format!(" AND language = ?{}", args.len()));
    }
    if let Some(kind) = filter.kind {
        args.push(kind.as_str().to_string());
        sql.push_str(&format!(" AND kind = ?{}", args.len()));
    }
    sql.push_str(
        " ORDER BY CASE kind
             WHEN 'vulnerable' THEN 0
             WHEN 'fixed' THEN 1
             ELSE 2
           END, language",
    );
    sql.push_str(&format!(" LIMIT {cap}"));

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_store_err(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            let kind_raw: String = row.get(2)?;
            Ok(CodeExampleRow {
                advisory_id: row.get(0)?,
                weakness_id: row.get(1)?,
                kind: ExampleKind::parse(&kind_raw).unwrap_or(ExampleKind::Vulnerable),
                language: row.get(3)?,
                content: row.get(4)?,
                content_hash: row.get(5)?,
                ecosystem: row.get(6)?,
            })
        })
        .map_err(|e| to_store_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_store_err(e.to_string()))
}

pub fn code_example_count(conn: &Connection) -> ArgusResult<u64> {
    conn.query_row("SELECT COUNT(*) FROM code_examples", [], |row| row.get(0))
        .map_err(|e| to_store_err(e.to_string()))
}
