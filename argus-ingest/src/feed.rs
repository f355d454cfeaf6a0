//! GitHub security advisory feed client.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use argus_core::errors::{ArgusResult, FeedError};
use argus_core::models::{Advisory, AdvisoryPage};
use argus_core::traits::IAdvisoryFeed;

/// GHSA wire shape, narrowed to the fields the pipeline reads.
#[derive(Debug, Deserialize)]
struct WireAdvisory {
    ghsa_id: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    cve_id: Option<String>,
    #[serde(default)]
    cwes: Vec<WireCwe>,
    #[serde(default)]
    cvss: Option<WireCvss>,
    #[serde(default)]
    vulnerabilities: Vec<WireVulnerability>,
    #[serde(default)]
    published_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct WireCwe {
    cwe_id: String,
}

#[derive(Debug, Deserialize)]
struct WireCvss {
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireVulnerability {
    #[serde(default)]
    package: Option<WirePackage>,
}

#[derive(Debug, Deserialize)]
struct WirePackage {
    #[serde(default)]
    ecosystem: String,
}

impl WireAdvisory {
    fn into_advisory(self, requested_ecosystem: &str) -> Advisory {
        let ecosystem = self
            .vulnerabilities
            .iter()
            .find_map(|v| v.package.as_ref().map(|p| p.ecosystem.clone()))
            .unwrap_or_else(|| requested_ecosystem.to_string());
        Advisory {
            id: self.ghsa_id,
            summary: self.summary,
            description: self.description,
            severity: self.severity,
            ecosystem,
            cve_ids: self.cve_id.into_iter().collect(),
            weakness_ids: self.cwes.into_iter().map(|c| c.cwe_id).collect(),
            cvss: self.cvss.and_then(|c| c.score),
            published_at: self.published_at,
        }
    }
}

pub struct GhsaFeed {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl GhsaFeed {
    pub fn new(endpoint: String, token: Option<String>, timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("argus-ingest")
            .build()
            .unwrap_or_default();
        GhsaFeed {
            client,
            endpoint,
            token,
        }
    }
}

#[async_trait]
impl IAdvisoryFeed for GhsaFeed {
    async fn fetch_page(
        &self,
        ecosystem: &str,
        severity: &str,
        page: u32,
        page_size: usize,
    ) -> ArgusResult<AdvisoryPage> {
        let mut request = self.client.get(&self.endpoint).query(&[
            ("ecosystem", ecosystem),
            ("severity", severity),
            ("page", &page.to_string()),
            ("per_page", &page_size.to_string()),
        ]);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| FeedError::Http {
            message: e.to_string(),
        })?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS | StatusCode::FORBIDDEN => {
                let retry_after_ms = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(|secs| secs * 1000);
                return Err(FeedError::RateLimited { retry_after_ms }.into());
            }
            status if !status.is_success() => {
                return Err(FeedError::Http {
                    message: format!("status {status}"),
                }
                .into());
            }
            _ => {}
        }

        let wire: Vec<WireAdvisory> =
            response.json().await.map_err(|e| FeedError::Decode {
                message: e.to_string(),
            })?;
        debug!(ecosystem, severity, page, count = wire.len(), "page fetched");

        Ok(AdvisoryPage {
            advisories: wire
                .into_iter()
                .map(|w| w.into_advisory(ecosystem))
                .collect(),
            page,
            requested_size: page_size,
        })
    }

    fn source(&self) -> &str {
        "ghsa"
    }
}
