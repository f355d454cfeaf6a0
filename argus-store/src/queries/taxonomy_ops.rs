//! Category and weakness catalog: upserts and id-filtered similarity search.

use rusqlite::{params, params_from_iter, Connection};

use argus_core::errors::ArgusResult;
use argus_core::models::{CategoryRow, WeaknessRow};

use crate::queries::placeholders;
use crate::to_store_err;
use crate::vectors::{bytes_to_f32_vec, f32_vec_to_bytes, similarity_score};

pub fn upsert_category(
    conn: &Connection,
    row: &CategoryRow,
    embedding: &[f32],
) -> ArgusResult<()> {
    conn.execute(
        "INSERT INTO categories (id, name, description, embedding, dimensions)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            embedding = excluded.embedding,
            dimensions = excluded.dimensions",
        params![
            row.id,
            row.name,
            row.description,
            f32_vec_to_bytes(embedding),
            embedding.len() as i64,
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

pub fn upsert_weakness(
    conn: &Connection,
    row: &WeaknessRow,
    embedding: &[f32],
) -> ArgusResult<()> {
    conn.execute(
        "INSERT INTO weaknesses (id, name, description, mitigation, embedding, dimensions)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            mitigation = excluded.mitigation,
            embedding = excluded.embedding,
            dimensions = excluded.dimensions",
        params![
            row.id,
            row.name,
            row.description,
            row.mitigation,
            f32_vec_to_bytes(embedding),
            embedding.len() as i64,
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

/// Similarity-ranked categories restricted to `id = ANY(ids)`.
/// Cosine similarity is computed in-process over the stored blobs.
pub fn search_categories(
    conn: &Connection,
    query_embedding: &[f32],
    ids: &[String],
    top_k: usize,
) -> ArgusResult<Vec<(CategoryRow, f64)>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id, name, description, embedding FROM categories WHERE id IN ({})",
        placeholders(ids.len())
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_store_err(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), |row| {
            Ok((
                CategoryRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                },
                row.get::<_, Vec<u8>>(3)?,
            ))
        })
        .map_err(|e| to_store_err(e.to_string()))?;

    let mut scored = Vec::new();
    for row in rows {
        let (category, blob) = row.map_err(|e| to_store_err(e.to_string()))?;
        let stored = bytes_to_f32_vec(&blob);
        if stored.len() != query_embedding.len() {
            continue;
        }
        scored.push((category, similarity_score(query_embedding, &stored)));
    }
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);
    Ok(scored)
}

/// Similarity-ranked weaknesses restricted to `id = ANY(ids)`.
pub fn search_weaknesses(
    conn: &Connection,
    query_embedding: &[f32],
    ids: &[String],
    top_k: usize,
) -> ArgusResult<Vec<(WeaknessRow, f64)>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id, name, description, mitigation, embedding FROM weaknesses WHERE id IN ({})",
        placeholders(ids.len())
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_store_err(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), |row| {
            Ok((
                WeaknessRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    mitigation: row.get(3)?,
                },
                row.get::<_, Vec<u8>>(4)?,
            ))
        })
        .map_err(|e| to_store_err(e.to_string()))?;

    let mut scored = Vec::new();
    for row in rows {
        let (weakness, blob) = row.map_err(|e| to_store_err(e.to_string()))?;
        let stored = bytes_to_f32_vec(&blob);
        if stored.len() != query_embedding.len() {
            continue;
        }
        scored.push((weakness, similarity_score(query_embedding, &stored)));
    }
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);
    Ok(scored)
}
