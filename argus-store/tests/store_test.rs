//! Integration tests for the knowledge store engine.
//!
//! Every test opens a fresh in-memory store, so migrations run on each
//! open and the tests double as a migration smoke check.

use chrono::{TimeZone, Utc};

use argus_core::models::{
    BreachRow, CategoryRow, CodeExampleRow, ExampleFilter, ExampleKind, ExploitRow, PartitionKey,
    PartitionState, Severity, VulnerabilityRow, WeaknessRow,
};
use argus_core::traits::IKnowledgeStore;
use argus_store::StoreEngine;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_store() -> StoreEngine {
    StoreEngine::open_in_memory().expect("in-memory store")
}

fn category(id: &str, name: &str) -> CategoryRow {
    CategoryRow {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} description"),
    }
}

fn weakness(id: &str, name: &str) -> WeaknessRow {
    WeaknessRow {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} description"),
        mitigation: format!("{name} mitigation"),
    }
}

fn vulnerability(cve_id: &str, weakness_ids: &[&str]) -> VulnerabilityRow {
    VulnerabilityRow {
        cve_id: cve_id.to_string(),
        summary: format!("{cve_id} summary"),
        severity: Severity::High,
        cvss: 8.1,
        published_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
        weakness_ids: weakness_ids.iter().map(|s| s.to_string()).collect(),
    }
}

fn exploit(id: &str, cve_id: &str, difficulty: u8, verified: bool) -> ExploitRow {
    ExploitRow {
        id: id.to_string(),
        cve_id: cve_id.to_string(),
        title: format!("exploit {id}"),
        source_url: format!("https://exploits.example/{id}"),
        difficulty,
        verified,
        disclosed_at: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
    }
}

fn breach(id: &str, cve_id: &str, severity_rank: u8, records: i64) -> BreachRow {
    BreachRow {
        id: id.to_string(),
        cve_id: cve_id.to_string(),
        organization: format!("org-{id}"),
        year: 2023,
        severity_rank,
        records_affected: records,
        financial_impact_usd: records * 10,
        summary: format!("breach {id}"),
    }
}

fn example(advisory: &str, weakness: &str, kind: ExampleKind, content: &str) -> CodeExampleRow {
    CodeExampleRow {
        advisory_id: advisory.to_string(),
        weakness_id: weakness.to_string(),
        kind,
        language: "python".to_string(),
        content: content.to_string(),
        content_hash: blake3::hash(content.as_bytes()).to_hex().to_string(),
        ecosystem: "pip".to_string(),
    }
}

/// Orthogonal unit embeddings make similarity ordering deterministic:
/// a query equal to one axis scores 1.0 against it and 0.5 against the
/// others (after shifting cosine into [0, 1]).
fn axis(dim: usize, index: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[index] = 1.0;
    v
}

// ---------------------------------------------------------------------------
// Taxonomy upserts and similarity search
// ---------------------------------------------------------------------------

#[test]
fn category_upsert_is_idempotent_and_updates() {
    let store = test_store();
    let emb = axis(4, 0);

    store
        .upsert_category(&category("A03:injection", "Injection"), &emb)
        .unwrap();
    let mut updated = category("A03:injection", "Injection");
    updated.description = "revised".to_string();
    store.upsert_category(&updated, &emb).unwrap();

    let ids = vec!["A03:injection".to_string()];
    let hits = store.search_categories(&emb, &ids, 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.description, "revised");
}

#[test]
fn category_search_orders_by_similarity_and_truncates() {
    let store = test_store();
    store
        .upsert_category(&category("A01:broken-access-control", "Broken Access Control"), &axis(4, 0))
        .unwrap();
    store
        .upsert_category(&category("A03:injection", "Injection"), &axis(4, 1))
        .unwrap();
    store
        .upsert_category(&category("A10:ssrf", "SSRF"), &axis(4, 2))
        .unwrap();

    let ids: Vec<String> = vec![
        "A01:broken-access-control".into(),
        "A03:injection".into(),
        "A10:ssrf".into(),
    ];
    let hits = store.search_categories(&axis(4, 1), &ids, 2).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].0.id, "A03:injection");
    assert!(hits[0].1 > hits[1].1);
}

#[test]
fn category_search_restricts_to_requested_ids() {
    let store = test_store();
    store
        .upsert_category(&category("A03:injection", "Injection"), &axis(4, 0))
        .unwrap();
    store
        .upsert_category(&category("A10:ssrf", "SSRF"), &axis(4, 0))
        .unwrap();

    let ids = vec!["A10:ssrf".to_string()];
    let hits = store.search_categories(&axis(4, 0), &ids, 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.id, "A10:ssrf");
}

#[test]
fn empty_id_set_short_circuits_to_empty() {
    let store = test_store();
    store
        .upsert_category(&category("A03:injection", "Injection"), &axis(4, 0))
        .unwrap();
    let hits = store.search_categories(&axis(4, 0), &[], 10).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn weakness_search_skips_dimension_mismatch() {
    let store = test_store();
    store
        .upsert_weakness(&weakness("CWE-89", "SQL Injection"), &axis(4, 0))
        .unwrap();
    store
        .upsert_weakness(&weakness("CWE-79", "XSS"), &axis(8, 0))
        .unwrap();

    let ids = vec!["CWE-89".to_string(), "CWE-79".to_string()];
    let hits = store.search_weaknesses(&axis(4, 0), &ids, 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.id, "CWE-89");
}

// ---------------------------------------------------------------------------
// Vulnerability records with exploit and breach linkage
// ---------------------------------------------------------------------------

#[test]
fn vulnerability_round_trips_with_weakness_ids() {
    let store = test_store();
    let row = vulnerability("CVE-2024-1111", &["CWE-89", "CWE-79"]);
    store.upsert_vulnerability(&row).unwrap();

    let loaded = store.get_vulnerability("CVE-2024-1111").unwrap().unwrap();
    assert_eq!(loaded, row);
    assert!(store.get_vulnerability("CVE-2024-9999").unwrap().is_none());
}

#[test]
fn exploits_surface_easiest_verified_first() {
    let store = test_store();
    store
        .upsert_vulnerability(&vulnerability("CVE-2024-1111", &["CWE-89"]))
        .unwrap();
    store
        .upsert_exploit(&exploit("exp-hard", "CVE-2024-1111", 4, true))
        .unwrap();
    store
        .upsert_exploit(&exploit("exp-easy-unverified", "CVE-2024-1111", 1, false))
        .unwrap();
    store
        .upsert_exploit(&exploit("exp-easy-verified", "CVE-2024-1111", 1, true))
        .unwrap();

    let exploits = store.exploits_for("CVE-2024-1111").unwrap();
    let ids: Vec<&str> = exploits.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["exp-easy-verified", "exp-easy-unverified", "exp-hard"]);
}

#[test]
fn breaches_order_by_rank_then_impact() {
    let store = test_store();
    store
        .upsert_breach(&breach("br-minor", "CVE-2024-1111", 3, 1_000))
        .unwrap();
    store
        .upsert_breach(&breach("br-big", "CVE-2024-1111", 1, 5_000_000))
        .unwrap();
    store
        .upsert_breach(&breach("br-small", "CVE-2024-1111", 1, 10_000))
        .unwrap();

    let breaches = store.breaches_for("CVE-2024-1111").unwrap();
    let ids: Vec<&str> = breaches.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["br-big", "br-small", "br-minor"]);
}

// ---------------------------------------------------------------------------
// Code-example dedup and filtered retrieval
// ---------------------------------------------------------------------------

#[test]
fn duplicate_example_is_ignored_not_duplicated() {
    let store = test_store();
    let row = example("GHSA-aaaa", "CWE-89", ExampleKind::Vulnerable, "SELECT * ...");

    assert!(store.insert_code_example(&row, &axis(4, 0)).unwrap());
    assert!(!store.insert_code_example(&row, &axis(4, 0)).unwrap());
    assert_eq!(store.code_example_count().unwrap(), 1);
}

#[test]
fn same_content_under_different_advisory_is_a_new_row() {
    let store = test_store();
    let a = example("GHSA-aaaa", "CWE-89", ExampleKind::Vulnerable, "SELECT * ...");
    let b = example("GHSA-bbbb", "CWE-89", ExampleKind::Vulnerable, "SELECT * ...");

    assert!(store.insert_code_example(&a, &axis(4, 0)).unwrap());
    assert!(store.insert_code_example(&b, &axis(4, 0)).unwrap());
    assert_eq!(store.code_example_count().unwrap(), 2);
}

#[test]
fn examples_filter_by_kind_and_order_vulnerable_first() {
    let store = test_store();
    store
        .insert_code_example(
            &example("GHSA-aaaa", "CWE-89", ExampleKind::Fixed, "fixed snippet"),
            &axis(4, 0),
        )
        .unwrap();
    store
        .insert_code_example(
            &example("GHSA-aaaa", "CWE-89", ExampleKind::Vulnerable, "vuln snippet"),
            &axis(4, 0),
        )
        .unwrap();
    store
        .insert_code_example(
            &example("GHSA-aaaa", "CWE-79", ExampleKind::Exploit, "exploit snippet"),
            &axis(4, 0),
        )
        .unwrap();

    let ids: Vec<String> = vec!["CWE-89".into(), "CWE-79".into()];
    let all = store
        .code_examples_for(&ids, &ExampleFilter::default(), 10)
        .unwrap();
    let kinds: Vec<ExampleKind> = all.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![ExampleKind::Vulnerable, ExampleKind::Fixed, ExampleKind::Exploit]
    );

    let filter = ExampleFilter {
        language: None,
        kind: Some(ExampleKind::Fixed),
    };
    let fixed = store.code_examples_for(&ids, &filter, 10).unwrap();
    assert_eq!(fixed.len(), 1);
    assert_eq!(fixed[0].content, "fixed snippet");
}

#[test]
fn example_cap_limits_rows() {
    let store = test_store();
    for i in 0..5 {
        let row = example(
            "GHSA-aaaa",
            "CWE-89",
            ExampleKind::Vulnerable,
            &format!("snippet {i}"),
        );
        store.insert_code_example(&row, &axis(4, 0)).unwrap();
    }
    let ids = vec!["CWE-89".to_string()];
    let capped = store
        .code_examples_for(&ids, &ExampleFilter::default(), 3)
        .unwrap();
    assert_eq!(capped.len(), 3);
}

// ---------------------------------------------------------------------------
// Partition state
// ---------------------------------------------------------------------------

fn partition_key(ecosystem: &str, severity: &str) -> PartitionKey {
    PartitionKey {
        source: "ghsa".to_string(),
        ecosystem: ecosystem.to_string(),
        severity: severity.to_string(),
    }
}

#[test]
fn missing_partition_loads_as_none() {
    let store = test_store();
    assert!(store.load_partition(&partition_key("pip", "high")).unwrap().is_none());
}

#[test]
fn partition_save_load_round_trip() {
    let store = test_store();
    let key = partition_key("pip", "high");

    let mut state = PartitionState::fresh();
    state.advance(50, 12, false);
    store.save_partition(&key, &state).unwrap();

    let loaded = store.load_partition(&key).unwrap().unwrap();
    assert_eq!(loaded.last_page, 1);
    assert_eq!(loaded.total_fetched, 50);
    assert_eq!(loaded.total_inserted, 12);
    assert!(!loaded.exhausted);

    state.advance(20, 3, true);
    store.save_partition(&key, &state).unwrap();
    let loaded = store.load_partition(&key).unwrap().unwrap();
    assert_eq!(loaded.last_page, 2);
    assert_eq!(loaded.total_fetched, 70);
    assert!(loaded.exhausted);
}

#[test]
fn reset_drops_only_the_named_source() {
    let store = test_store();
    store
        .save_partition(&partition_key("pip", "high"), &PartitionState::fresh())
        .unwrap();
    store
        .save_partition(&partition_key("npm", "critical"), &PartitionState::fresh())
        .unwrap();
    let other = PartitionKey {
        source: "osv".to_string(),
        ecosystem: "pip".to_string(),
        severity: "high".to_string(),
    };
    store.save_partition(&other, &PartitionState::fresh()).unwrap();

    assert_eq!(store.reset_partitions("ghsa").unwrap(), 2);
    assert!(store.list_partitions("ghsa").unwrap().is_empty());
    assert_eq!(store.list_partitions("osv").unwrap().len(), 1);
}

#[test]
fn list_partitions_orders_by_ecosystem_then_severity() {
    let store = test_store();
    for (eco, sev) in [("npm", "high"), ("pip", "critical"), ("npm", "critical")] {
        store
            .save_partition(&partition_key(eco, sev), &PartitionState::fresh())
            .unwrap();
    }
    let listed = store.list_partitions("ghsa").unwrap();
    let keys: Vec<String> = listed.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(
        keys,
        vec!["ghsa/npm/critical", "ghsa/npm/high", "ghsa/pip/critical"]
    );
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[test]
fn vacuum_succeeds_on_a_live_store() {
    let store = test_store();
    store
        .upsert_category(&category("A03:injection", "Injection"), &axis(4, 0))
        .unwrap();
    store.vacuum().unwrap();
}

#[test]
fn on_disk_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("argus.db");

    {
        let store = StoreEngine::open(&path).unwrap();
        store
            .upsert_vulnerability(&vulnerability("CVE-2024-1111", &["CWE-89"]))
            .unwrap();
    }

    let store = StoreEngine::open(&path).unwrap();
    let loaded = store.get_vulnerability("CVE-2024-1111").unwrap().unwrap();
    assert_eq!(loaded.cve_id, "CVE-2024-1111");
}
