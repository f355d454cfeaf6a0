//! The resumable ingestion loop.
//!
//! Partitions (ecosystem × severity) are visited round-robin, one page
//! at a time; exhausted partitions are skipped without a network call.
//! Page N+1 of a partition is never fetched before page N's progress
//! row is durably recorded. Advisories within a page run under a
//! bounded worker pool; one advisory's failure never cancels siblings.
//! A fatal capacity condition stops the loop, lets in-flight work
//! finish, and leaves state resumable.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use argus_core::config::IngestConfig;
use argus_core::errors::{ArgusError, ArgusResult, FeedError};
use argus_core::models::{
    Advisory, IngestReport, PartitionKey, PartitionProgress, PartitionState, Severity,
    VulnerabilityRow,
};
use argus_core::traits::{IAdvisoryFeed, IEmbeddingProvider, IKnowledgeStore};
use argus_embeddings::retry::RetryPolicy;

use crate::extract;

pub struct IngestPipeline {
    store: Arc<dyn IKnowledgeStore>,
    feed: Arc<dyn IAdvisoryFeed>,
    provider: Arc<dyn IEmbeddingProvider>,
    config: IngestConfig,
}

/// Per-advisory result: (ecosystem, weakness id) per inserted example.
#[derive(Debug, Default)]
struct AdvisoryOutcome {
    inserted: Vec<(String, String)>,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn IKnowledgeStore>,
        feed: Arc<dyn IAdvisoryFeed>,
        provider: Arc<dyn IEmbeddingProvider>,
        config: IngestConfig,
    ) -> Self {
        IngestPipeline {
            store,
            feed,
            provider,
            config,
        }
    }

    /// Drive the partition grid until the wall-clock budget elapses,
    /// every partition is exhausted, or a fatal capacity condition
    /// stops the run. Always returns a report with resumable state.
    pub async fn run(&self) -> ArgusResult<IngestReport> {
        let deadline = Instant::now() + self.config.run_budget();
        let source = self.feed.source().to_string();
        let policy = RetryPolicy::from_ingest(&self.config);

        let mut partitions: Vec<(PartitionKey, PartitionState)> = Vec::new();
        for ecosystem in &self.config.ecosystems {
            for severity in &self.config.severities {
                let key = PartitionKey {
                    source: source.clone(),
                    ecosystem: ecosystem.clone(),
                    severity: severity.clone(),
                };
                let state = self
                    .store
                    .load_partition(&key)?
                    .unwrap_or_else(PartitionState::fresh);
                partitions.push((key, state));
            }
        }
        info!(partitions = partitions.len(), source, "ingestion starting");

        let mut report = IngestReport::default();
        let mut feed_failures: u32 = 0;

        'run: loop {
            let mut fetched_any = false;
            for (key, state) in partitions.iter_mut() {
                if state.exhausted {
                    continue;
                }
                if Instant::now() >= deadline {
                    info!("run budget elapsed, stopping");
                    break 'run;
                }
                fetched_any = true;

                let page = state.next_page();
                debug!(partition = %key, page, "fetching page");
                let fetched = match self
                    .feed
                    .fetch_page(&key.ecosystem, &key.severity, page, self.config.page_size)
                    .await
                {
                    Ok(fetched) => {
                        feed_failures = 0;
                        fetched
                    }
                    // Every failed fetch, rate limit or otherwise, feeds
                    // the same consecutive-failure backoff: a persistently
                    // timing-out endpoint must trip the breaker, not spin
                    // for the whole budget.
                    Err(e) => {
                        feed_failures += 1;
                        report.errors += 1;
                        if feed_failures >= self.config.max_consecutive_failures {
                            let fatal: ArgusError = FeedError::QuotaExhausted {
                                consecutive_failures: feed_failures,
                            }
                            .into();
                            error!(error = %fatal, "feed failing persistently, stopping");
                            break 'run;
                        }
                        let delay = match &e {
                            ArgusError::Feed(FeedError::RateLimited {
                                retry_after_ms: Some(ms),
                            }) => std::time::Duration::from_millis(*ms).min(policy.max_backoff),
                            _ => policy.backoff_for(feed_failures),
                        };
                        warn!(
                            partition = %key,
                            page,
                            error = %e,
                            delay_ms = delay.as_millis() as u64,
                            "page fetch failed, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                };

                let exhausted = fetched.is_last();
                match self.process_page(&fetched.advisories, &mut report).await {
                    Ok(inserted) => {
                        // Advance even for zero-result pages, then record
                        // durably before any further fetch of this partition.
                        state.advance(fetched.advisories.len(), inserted, exhausted);
                        self.store.save_partition(key, state)?;
                        info!(
                            partition = %key,
                            page,
                            fetched = fetched.advisories.len(),
                            inserted,
                            exhausted,
                            "page processed"
                        );
                    }
                    Err(e) => {
                        // Only fatal capacity propagates out of a page.
                        // The page is not advanced: dedup makes the
                        // refetch on resume idempotent.
                        error!(partition = %key, page, error = %e, "fatal capacity condition, persisting and stopping");
                        report.errors += 1;
                        break 'run;
                    }
                }
            }
            if !fetched_any {
                info!("all partitions exhausted");
                break;
            }
        }

        report.partitions = partitions
            .into_iter()
            .map(|(key, state)| PartitionProgress { key, state })
            .collect();
        Ok(report)
    }

    /// Process one page under the bounded worker pool. Returns the
    /// number of inserted examples; `Err` only for fatal capacity,
    /// after in-flight siblings have finished.
    async fn process_page(
        &self,
        advisories: &[Advisory],
        report: &mut IngestReport,
    ) -> ArgusResult<usize> {
        let advisory_gate = Arc::new(Semaphore::new(self.config.advisory_workers));
        let embed_gate = Arc::new(Semaphore::new(self.config.embed_workers));
        let mut tasks: JoinSet<ArgusResult<AdvisoryOutcome>> = JoinSet::new();

        for advisory in advisories {
            report.advisories_seen += 1;
            if !advisory.references_any(&self.config.priority_weaknesses) {
                debug!(advisory = advisory.id, "no priority weakness, skipping");
                continue;
            }
            report.advisories_relevant += 1;

            let advisory = advisory.clone();
            let store = Arc::clone(&self.store);
            let provider = Arc::clone(&self.provider);
            let advisory_gate = Arc::clone(&advisory_gate);
            let embed_gate = Arc::clone(&embed_gate);
            let embed_batch = self.config.embed_batch.max(1);
            tasks.spawn(async move {
                // The gates are never closed while tasks run.
                let Ok(_permit) = advisory_gate.acquire_owned().await else {
                    return Ok(AdvisoryOutcome::default());
                };
                process_advisory(store, provider, embed_gate, embed_batch, advisory).await
            });
        }

        let mut inserted_total = 0;
        let mut fatal: Option<ArgusError> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(outcome)) => {
                    inserted_total += outcome.inserted.len();
                    for (ecosystem, weakness_id) in outcome.inserted {
                        report.record_insert(&ecosystem, &weakness_id);
                    }
                }
                Ok(Err(e)) if e.is_fatal_capacity() => {
                    // Keep joining: in-flight siblings finish first.
                    if fatal.is_none() {
                        fatal = Some(e);
                    }
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "advisory failed, siblings continue");
                    report.errors += 1;
                }
                Err(e) => {
                    warn!(error = %e, "advisory task panicked");
                    report.errors += 1;
                }
            }
        }
        match fatal {
            Some(e) => Err(e),
            None => Ok(inserted_total),
        }
    }
}

/// Process one advisory: upsert its vulnerability records, extract and
/// classify code blocks, embed candidates in sub-batches, insert with
/// dedup.
async fn process_advisory(
    store: Arc<dyn IKnowledgeStore>,
    provider: Arc<dyn IEmbeddingProvider>,
    embed_gate: Arc<Semaphore>,
    embed_batch: usize,
    advisory: Advisory,
) -> ArgusResult<AdvisoryOutcome> {
    for cve_id in &advisory.cve_ids {
        store.upsert_vulnerability(&VulnerabilityRow {
            cve_id: cve_id.clone(),
            summary: advisory.summary.clone(),
            severity: Severity::parse(&advisory.severity).unwrap_or(Severity::Low),
            cvss: advisory.cvss.unwrap_or(0.0),
            published_at: advisory.published_at,
            weakness_ids: advisory.weakness_ids.clone(),
        })?;
    }

    let candidates = extract::candidates(&advisory);
    let mut outcome = AdvisoryOutcome::default();
    for chunk in candidates.chunks(embed_batch) {
        let texts: Vec<String> = chunk.iter().map(|row| row.content.clone()).collect();
        let embeddings = {
            let Ok(_permit) = embed_gate.acquire().await else {
                return Ok(outcome);
            };
            provider.embed_batch(&texts).await?
        };
        for (row, embedding) in chunk.iter().zip(&embeddings) {
            if store.insert_code_example(row, embedding)? {
                outcome
                    .inserted
                    .push((row.ecosystem.clone(), row.weakness_id.clone()));
            } else {
                debug!(advisory = row.advisory_id, "duplicate example skipped");
            }
        }
    }
    Ok(outcome)
}
