//! Vulnerability records with exploit and breach linkage.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use argus_core::errors::ArgusResult;
use argus_core::models::{BreachRow, ExploitRow, Severity, VulnerabilityRow};

use crate::to_store_err;

pub fn upsert_vulnerability(conn: &Connection, row: &VulnerabilityRow) -> ArgusResult<()> {
    let weakness_json = serde_json::to_string(&row.weakness_ids)?;
    conn.execute(
        "INSERT INTO vulnerabilities (cve_id, summary, severity, cvss, published_at, weakness_ids)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(cve_id) DO UPDATE SET
            summary = excluded.summary,
            severity = excluded.severity,
            cvss = excluded.cvss,
            published_at = excluded.published_at,
            weakness_ids = excluded.weakness_ids",
        params![
            row.cve_id,
            row.summary,
            row.severity.as_str(),
            row.cvss,
            row.published_at.map(|t| t.to_rfc3339()),
            weakness_json,
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

pub fn upsert_exploit(conn: &Connection, row: &ExploitRow) -> ArgusResult<()> {
    conn.execute(
        "INSERT INTO exploits (id, cve_id, title, source_url, difficulty, verified, disclosed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            source_url = excluded.source_url,
            difficulty = excluded.difficulty,
            verified = excluded.verified,
            disclosed_at = excluded.disclosed_at",
        params![
            row.id,
            row.cve_id,
            row.title,
            row.source_url,
            row.difficulty,
            row.verified as i32,
            row.disclosed_at.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

pub fn upsert_breach(conn: &Connection, row: &BreachRow) -> ArgusResult<()> {
    conn.execute(
        "INSERT INTO breaches (id, cve_id, organization, year, severity_rank,
                               records_affected, financial_impact_usd, summary)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            organization = excluded.organization,
            year = excluded.year,
            severity_rank = excluded.severity_rank,
            records_affected = excluded.records_affected,
            financial_impact_usd = excluded.financial_impact_usd,
            summary = excluded.summary",
        params![
            row.id,
            row.cve_id,
            row.organization,
            row.year,
            row.severity_rank,
            row.records_affected,
            row.financial_impact_usd,
            row.summary,
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

pub fn get_vulnerability(
    conn: &Connection,
    cve_id: &str,
) -> ArgusResult<Option<VulnerabilityRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT cve_id, summary, severity, cvss, published_at, weakness_ids
             FROM vulnerabilities WHERE cve_id = ?1",
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    let mut rows = stmt
        .query(params![cve_id])
        .map_err(|e| to_store_err(e.to_string()))?;

    match rows.next().map_err(|e| to_store_err(e.to_string()))? {
        Some(row) => Ok(Some(read_vulnerability(row)?)),
        None => Ok(None),
    }
}

fn read_vulnerability(row: &rusqlite::Row<'_>) -> ArgusResult<VulnerabilityRow> {
    let severity_raw: String = row.get(2).map_err(|e| to_store_err(e.to_string()))?;
    let published_raw: Option<String> = row.get(4).map_err(|e| to_store_err(e.to_string()))?;
    let weakness_json: String = row.get(5).map_err(|e| to_store_err(e.to_string()))?;
    Ok(VulnerabilityRow {
        cve_id: row.get(0).map_err(|e| to_store_err(e.to_string()))?,
        summary: row.get(1).map_err(|e| to_store_err(e.to_string()))?,
        severity: Severity::parse(&severity_raw).unwrap_or(Severity::Low),
        cvss: row.get(3).map_err(|e| to_store_err(e.to_string()))?,
        published_at: published_raw.and_then(parse_rfc3339),
        weakness_ids: serde_json::from_str(&weakness_json)?,
    })
}

/// Exploits for a record, "easiest to exploit and verified" first:
/// difficulty ascending, then verified before unverified, then most
/// recent disclosure.
pub fn exploits_for(conn: &Connection, cve_id: &str) -> ArgusResult<Vec<ExploitRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, cve_id, title, source_url, difficulty, verified, disclosed_at
             FROM exploits WHERE cve_id = ?1
             ORDER BY difficulty ASC, verified DESC, disclosed_at DESC",
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![cve_id], |row| {
            Ok(ExploitRow {
                id: row.get(0)?,
                cve_id: row.get(1)?,
                title: row.get(2)?,
                source_url: row.get(3)?,
                difficulty: row.get(4)?,
                verified: row.get::<_, i32>(5)? != 0,
                disclosed_at: row.get::<_, Option<String>>(6)?.and_then(parse_rfc3339),
            })
        })
        .map_err(|e| to_store_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_store_err(e.to_string()))
}

/// Breaches for a record, ordered by severity rank then impact.
pub fn breaches_for(conn: &Connection, cve_id: &str) -> ArgusResult<Vec<BreachRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, cve_id, organization, year, severity_rank,
                    records_affected, financial_impact_usd, summary
             FROM breaches WHERE cve_id = ?1
             ORDER BY severity_rank ASC, records_affected DESC, financial_impact_usd DESC",
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![cve_id], |row| {
            Ok(BreachRow {
                id: row.get(0)?,
                cve_id: row.get(1)?,
                organization: row.get(2)?,
                year: row.get(3)?,
                severity_rank: row.get(4)?,
                records_affected: row.get(5)?,
                financial_impact_usd: row.get(6)?,
                summary: row.get(7)?,
            })
        })
        .map_err(|e| to_store_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_store_err(e.to_string()))
}

fn parse_rfc3339(raw: String) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
