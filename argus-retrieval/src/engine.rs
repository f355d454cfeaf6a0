//! RetrievalEngine: orchestrates the five-step retrieval pipeline.
//!
//! 1. Embed the compact scan digest (the only hard failure).
//! 2. Concurrent id-filtered similarity fetches over categories and
//!    weaknesses; each degrades independently to empty.
//! 3. Optional re-rank with a deterministic fallback.
//! 4. Cross-reference expansion: CVE records, exploits, breaches,
//!    code examples; every branch best-effort.
//! 5. Assembly into one [`IntelContext`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use argus_core::config::RetrievalConfig;
use argus_core::errors::ArgusResult;
use argus_core::models::{ExampleFilter, ExampleKind, IntelContext, RetrievedItem};
use argus_core::traits::{IEmbeddingProvider, IKnowledgeStore, IRelevanceRanker};
use argus_scan::{render_compact, NormalizedScan};

use crate::crossref;
use crate::rank;

pub struct RetrievalEngine {
    store: Arc<dyn IKnowledgeStore>,
    provider: Arc<dyn IEmbeddingProvider>,
    ranker: Option<Arc<dyn IRelevanceRanker>>,
    config: RetrievalConfig,
}

impl RetrievalEngine {
    pub fn new(
        store: Arc<dyn IKnowledgeStore>,
        provider: Arc<dyn IEmbeddingProvider>,
        config: RetrievalConfig,
    ) -> Self {
        RetrievalEngine {
            store,
            provider,
            ranker: None,
            config,
        }
    }

    /// Wire in the relevance-scoring capability.
    pub fn with_ranker(mut self, ranker: Arc<dyn IRelevanceRanker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    /// Retrieve cross-referenced intelligence for a normalized scan.
    ///
    /// Total apart from embedding: every store branch degrades to empty
    /// with a warning, and an all-empty context is a valid result.
    pub async fn retrieve(&self, scan: &NormalizedScan) -> ArgusResult<IntelContext> {
        // Step 1: one embedding of the compact digest. Hard failure.
        let digest = render_compact(scan);
        let embedding = self.provider.embed(&digest).await?;
        debug!(dimensions = embedding.len(), "scan digest embedded");

        // Step 2: concurrent similarity fetches, independently degraded.
        let category_ids = scan.category_ids();
        let weakness_ids = scan.weakness_ids();
        let (categories, weaknesses) = self
            .fetch_taxonomy(embedding, category_ids, weakness_ids.clone())
            .await;

        // Step 3: optional re-rank, deterministic fallback.
        let ranker = self.ranker.as_deref();
        let categories = match self.config.rerank {
            true => {
                rank::rerank_or_fallback(ranker, &digest, categories, self.config.category_top_k)
                    .await
            }
            false => rank::fallback_order(categories, self.config.category_top_k),
        };
        let weaknesses = match self.config.rerank {
            true => {
                rank::rerank_or_fallback(ranker, &digest, weaknesses, self.config.weakness_top_k)
                    .await
            }
            false => rank::fallback_order(weaknesses, self.config.weakness_top_k),
        };

        // Step 4: cross-reference expansion, all branches best-effort.
        let cve_ids = crossref::extract_cve_ids(scan.reference_texts());
        let filter = self.example_filter();
        let cap = self.config.example_cap;
        let store = Arc::clone(&self.store);
        let expansion = tokio::task::spawn_blocking(move || {
            let vulnerabilities = crossref::expand_vulnerabilities(store.as_ref(), &cve_ids);
            let union = crossref::weakness_union(&weakness_ids, &vulnerabilities);
            let examples = crossref::fetch_examples(store.as_ref(), &union, &filter, cap);
            (vulnerabilities, examples)
        })
        .await;
        let (vulnerabilities, code_examples) = match expansion {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "cross-reference task failed, omitting expansion");
                (Vec::new(), Vec::new())
            }
        };

        // Step 5: assembly.
        let context = IntelContext {
            categories,
            weaknesses,
            vulnerabilities,
            code_examples,
        };
        info!(
            categories = context.categories.len(),
            weaknesses = context.weaknesses.len(),
            vulnerabilities = context.vulnerabilities.len(),
            examples = context.code_examples.len(),
            "retrieval assembled"
        );
        Ok(context)
    }

    /// The two taxonomy fetches have no data dependency; run them
    /// concurrently and let each fail on its own.
    async fn fetch_taxonomy(
        &self,
        embedding: Vec<f32>,
        category_ids: Vec<String>,
        weakness_ids: Vec<String>,
    ) -> (Vec<RetrievedItem>, Vec<RetrievedItem>) {
        let category_store = Arc::clone(&self.store);
        let category_embedding = embedding.clone();
        let category_top_k = self.config.category_top_k;
        let category_task = tokio::task::spawn_blocking(move || {
            category_store.search_categories(&category_embedding, &category_ids, category_top_k)
        });

        let weakness_store = Arc::clone(&self.store);
        let weakness_top_k = self.config.weakness_top_k;
        let weakness_task = tokio::task::spawn_blocking(move || {
            weakness_store.search_weaknesses(&embedding, &weakness_ids, weakness_top_k)
        });

        let (category_result, weakness_result) = tokio::join!(category_task, weakness_task);

        let categories = match category_result {
            Ok(Ok(rows)) => rows
                .into_iter()
                .map(|(row, score)| RetrievedItem::category(row, score))
                .collect(),
            Ok(Err(e)) => {
                warn!(error = %e, "category fetch failed, degrading to empty");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "category task failed, degrading to empty");
                Vec::new()
            }
        };
        let weaknesses = match weakness_result {
            Ok(Ok(rows)) => rows
                .into_iter()
                .map(|(row, score)| RetrievedItem::weakness(row, score))
                .collect(),
            Ok(Err(e)) => {
                warn!(error = %e, "weakness fetch failed, degrading to empty");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "weakness task failed, degrading to empty");
                Vec::new()
            }
        };
        (categories, weaknesses)
    }

    fn example_filter(&self) -> ExampleFilter {
        ExampleFilter {
            language: self.config.language_filter.clone(),
            kind: self
                .config
                .kind_filter
                .as_deref()
                .and_then(ExampleKind::parse),
        }
    }
}
