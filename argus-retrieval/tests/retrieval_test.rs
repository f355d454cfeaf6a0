//! Integration tests for the retrieval pipeline: totality under store
//! failure, re-rank fallback, and end-to-end assembly over a seeded
//! in-memory store.

use std::sync::Arc;

use async_trait::async_trait;

use argus_core::config::RetrievalConfig;
use argus_core::errors::{ArgusResult, EmbeddingError, RetrievalError, StoreError};
use argus_core::models::*;
use argus_core::traits::{IEmbeddingProvider, IKnowledgeStore, IRelevanceRanker};
use argus_embeddings::providers::hashed::HashedProvider;
use argus_retrieval::{render_context, RetrievalEngine};
use argus_scan::normalize;
use argus_store::StoreEngine;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn raw_finding(rule: &str, severity: &str, score: f64, description: &str) -> RawFinding {
    RawFinding {
        rule_id: rule.to_string(),
        title: format!("{rule} in request handler"),
        severity: severity.to_string(),
        score,
        endpoint: "/api/users".to_string(),
        method: "GET".to_string(),
        description: description.to_string(),
        evidence: None,
    }
}

fn sample_scan() -> argus_scan::NormalizedScan {
    normalize(&RawScan {
        scan_id: Some("scan-1".to_string()),
        target: None,
        findings: vec![
            raw_finding("sql-injection", "critical", 9.0, "similar to CVE-2024-1111"),
            raw_finding("xss-stored", "high", 7.0, ""),
        ],
    })
    .unwrap()
}

fn provider() -> Arc<dyn IEmbeddingProvider> {
    Arc::new(HashedProvider::new(64))
}

async fn embed(text: &str) -> Vec<f32> {
    HashedProvider::new(64).embed(text).await.unwrap()
}

// ---------------------------------------------------------------------------
// Totality under store failure
// ---------------------------------------------------------------------------

/// A store where every call fails.
struct BrokenStore;

fn broken<T>() -> ArgusResult<T> {
    Err(StoreError::Sqlite {
        message: "store offline".to_string(),
    }
    .into())
}

impl IKnowledgeStore for BrokenStore {
    fn upsert_category(&self, _: &CategoryRow, _: &[f32]) -> ArgusResult<()> {
        broken()
    }
    fn upsert_weakness(&self, _: &WeaknessRow, _: &[f32]) -> ArgusResult<()> {
        broken()
    }
    fn upsert_vulnerability(&self, _: &VulnerabilityRow) -> ArgusResult<()> {
        broken()
    }
    fn upsert_exploit(&self, _: &ExploitRow) -> ArgusResult<()> {
        broken()
    }
    fn upsert_breach(&self, _: &BreachRow) -> ArgusResult<()> {
        broken()
    }
    fn insert_code_example(&self, _: &CodeExampleRow, _: &[f32]) -> ArgusResult<bool> {
        broken()
    }
    fn search_categories(
        &self,
        _: &[f32],
        _: &[String],
        _: usize,
    ) -> ArgusResult<Vec<(CategoryRow, f64)>> {
        broken()
    }
    fn search_weaknesses(
        &self,
        _: &[f32],
        _: &[String],
        _: usize,
    ) -> ArgusResult<Vec<(WeaknessRow, f64)>> {
        broken()
    }
    fn get_vulnerability(&self, _: &str) -> ArgusResult<Option<VulnerabilityRow>> {
        broken()
    }
    fn exploits_for(&self, _: &str) -> ArgusResult<Vec<ExploitRow>> {
        broken()
    }
    fn breaches_for(&self, _: &str) -> ArgusResult<Vec<BreachRow>> {
        broken()
    }
    fn code_examples_for(
        &self,
        _: &[String],
        _: &ExampleFilter,
        _: usize,
    ) -> ArgusResult<Vec<CodeExampleRow>> {
        broken()
    }
    fn load_partition(&self, _: &PartitionKey) -> ArgusResult<Option<PartitionState>> {
        broken()
    }
    fn save_partition(&self, _: &PartitionKey, _: &PartitionState) -> ArgusResult<()> {
        broken()
    }
    fn reset_partitions(&self, _: &str) -> ArgusResult<usize> {
        broken()
    }
    fn list_partitions(&self, _: &str) -> ArgusResult<Vec<(PartitionKey, PartitionState)>> {
        broken()
    }
    fn code_example_count(&self) -> ArgusResult<u64> {
        broken()
    }
    fn vacuum(&self) -> ArgusResult<()> {
        broken()
    }
}

#[tokio::test]
async fn retrieval_is_total_when_every_store_call_fails() {
    let engine = RetrievalEngine::new(Arc::new(BrokenStore), provider(), RetrievalConfig::default());
    let context = engine.retrieve(&sample_scan()).await.unwrap();
    assert!(context.is_empty());
    // An all-empty context still renders something.
    assert!(!render_context(&context).is_empty());
}

#[tokio::test]
async fn embedding_failure_aborts_retrieval() {
    struct NoEmbeddings;

    #[async_trait]
    impl IEmbeddingProvider for NoEmbeddings {
        async fn embed(&self, _: &str) -> ArgusResult<Vec<f32>> {
            Err(EmbeddingError::ProviderUnavailable {
                provider: "test".to_string(),
            }
            .into())
        }
        async fn embed_batch(&self, _: &[String]) -> ArgusResult<Vec<Vec<f32>>> {
            Err(EmbeddingError::ProviderUnavailable {
                provider: "test".to_string(),
            }
            .into())
        }
        fn dimensions(&self) -> usize {
            64
        }
        fn name(&self) -> &str {
            "none"
        }
    }

    let engine = RetrievalEngine::new(
        Arc::new(BrokenStore),
        Arc::new(NoEmbeddings),
        RetrievalConfig::default(),
    );
    assert!(engine.retrieve(&sample_scan()).await.is_err());
}

// ---------------------------------------------------------------------------
// Re-rank fallback
// ---------------------------------------------------------------------------

struct FailingRanker;

#[async_trait]
impl IRelevanceRanker for FailingRanker {
    async fn rank(
        &self,
        _: &str,
        _: Vec<RetrievedItem>,
        _: usize,
    ) -> ArgusResult<Vec<RetrievedItem>> {
        Err(RetrievalError::RankingFailed {
            reason: "model offline".to_string(),
        }
        .into())
    }
}

async fn seeded_store() -> Arc<StoreEngine> {
    let store = StoreEngine::open_in_memory().unwrap();
    for (id, name) in [
        ("A03:injection", "Injection"),
        ("A01:broken-access-control", "Broken Access Control"),
    ] {
        let row = CategoryRow {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{name} issues"),
        };
        let embedding = embed(&format!("{name} {id}")).await;
        store.upsert_category(&row, &embedding).unwrap();
    }
    for (id, name) in [("CWE-89", "SQL Injection"), ("CWE-79", "Cross-site Scripting")] {
        let row = WeaknessRow {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{name} weakness"),
            mitigation: "parameterize".to_string(),
        };
        let embedding = embed(&format!("{name} {id}")).await;
        store.upsert_weakness(&row, &embedding).unwrap();
    }
    Arc::new(store)
}

#[tokio::test]
async fn failed_rerank_equals_similarity_order() {
    let store = seeded_store().await;
    let scan = sample_scan();

    let plain = RetrievalEngine::new(
        Arc::clone(&store) as Arc<dyn IKnowledgeStore>,
        provider(),
        RetrievalConfig {
            rerank: false,
            ..Default::default()
        },
    );
    let with_failing_ranker = RetrievalEngine::new(
        store as Arc<dyn IKnowledgeStore>,
        provider(),
        RetrievalConfig::default(),
    )
    .with_ranker(Arc::new(FailingRanker));

    let baseline = plain.retrieve(&scan).await.unwrap();
    let fallen_back = with_failing_ranker.retrieve(&scan).await.unwrap();

    let ids = |items: &[RetrievedItem]| -> Vec<String> {
        items
            .iter()
            .map(|i| match &i.source {
                SourceRecord::Category(c) => c.id.clone(),
                SourceRecord::Weakness(w) => w.id.clone(),
                _ => String::new(),
            })
            .collect()
    };
    assert_eq!(ids(&baseline.categories), ids(&fallen_back.categories));
    assert_eq!(ids(&baseline.weaknesses), ids(&fallen_back.weaknesses));
}

// ---------------------------------------------------------------------------
// End-to-end over a seeded store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cross_reference_expands_cve_mentions() {
    let store = seeded_store().await;
    store
        .upsert_vulnerability(&VulnerabilityRow {
            cve_id: "CVE-2024-1111".to_string(),
            summary: "sql injection in widget server".to_string(),
            severity: Severity::Critical,
            cvss: 9.8,
            published_at: None,
            weakness_ids: vec!["CWE-89".to_string()],
        })
        .unwrap();
    store
        .upsert_exploit(&ExploitRow {
            id: "exp-1".to_string(),
            cve_id: "CVE-2024-1111".to_string(),
            title: "public poc".to_string(),
            source_url: "https://exploits.example/1".to_string(),
            difficulty: 1,
            verified: true,
            disclosed_at: None,
        })
        .unwrap();
    let example = CodeExampleRow {
        advisory_id: "GHSA-aaaa".to_string(),
        weakness_id: "CWE-89".to_string(),
        kind: ExampleKind::Vulnerable,
        language: "python".to_string(),
        content: "cursor.execute(f\"SELECT {user}\")".to_string(),
        content_hash: "hash-1".to_string(),
        ecosystem: "pip".to_string(),
    };
    store.insert_code_example(&example, &[0.0; 4]).unwrap();

    let engine = RetrievalEngine::new(
        store as Arc<dyn IKnowledgeStore>,
        provider(),
        RetrievalConfig::default(),
    );
    let context = engine.retrieve(&sample_scan()).await.unwrap();

    assert_eq!(context.vulnerabilities.len(), 1);
    assert_eq!(context.vulnerabilities[0].record.cve_id, "CVE-2024-1111");
    assert_eq!(context.vulnerabilities[0].exploits.len(), 1);
    assert_eq!(context.code_examples.len(), 1);
    assert!(!context.categories.is_empty());
    assert!(!context.weaknesses.is_empty());

    let rendered = render_context(&context);
    assert!(rendered.contains("CVE-2024-1111"));
    assert!(rendered.contains("## Code examples"));
}
