//! HTTP embedding provider for OpenAI-shaped embedding endpoints.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use argus_core::errors::{ArgusResult, EmbeddingError};
use argus_core::traits::IEmbeddingProvider;

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// Network-backed provider. Failure classification lives here; the
/// retry layer decides what to do about each class.
pub struct HttpProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
    max_input_chars: usize,
}

impl HttpProvider {
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        dimensions: usize,
        max_input_chars: usize,
        timeout: std::time::Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        HttpProvider {
            client,
            endpoint,
            api_key,
            model,
            dimensions,
            max_input_chars,
        }
    }

    async fn request(&self, inputs: &[&str]) -> ArgusResult<Vec<Vec<f32>>> {
        for input in inputs {
            if input.chars().count() > self.max_input_chars {
                return Err(EmbeddingError::TokenLimit {
                    max_chars: self.max_input_chars,
                }
                .into());
            }
        }

        let body = json!({
            "model": self.model,
            "input": inputs,
        });
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbeddingError::RequestFailed {
                reason: e.to_string(),
            })?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_ms = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(|secs| secs * 1000);
                return Err(EmbeddingError::RateLimited { retry_after_ms }.into());
            }
            StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(EmbeddingError::TokenLimit {
                    max_chars: self.max_input_chars,
                }
                .into());
            }
            status if !status.is_success() => {
                return Err(EmbeddingError::RequestFailed {
                    reason: format!("status {status}"),
                }
                .into());
            }
            _ => {}
        }

        let parsed: EmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| EmbeddingError::RequestFailed {
                    reason: format!("decode: {e}"),
                })?;
        debug!(count = parsed.data.len(), "embedding response received");

        let mut vectors = Vec::with_capacity(parsed.data.len());
        for datum in parsed.data {
            if datum.embedding.len() != self.dimensions {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: datum.embedding.len(),
                }
                .into());
            }
            vectors.push(datum.embedding);
        }
        if vectors.len() != inputs.len() {
            return Err(EmbeddingError::RequestFailed {
                reason: format!("expected {} vectors, got {}", inputs.len(), vectors.len()),
            }
            .into());
        }
        Ok(vectors)
    }
}

#[async_trait]
impl IEmbeddingProvider for HttpProvider {
    async fn embed(&self, text: &str) -> ArgusResult<Vec<f32>> {
        let mut vectors = self.request(&[text]).await?;
        vectors.pop().ok_or_else(|| {
            EmbeddingError::RequestFailed {
                reason: "empty response".to_string(),
            }
            .into()
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> ArgusResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
        self.request(&inputs).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "http"
    }
}
