//! Remote embedding service over HTTP
//!
//! Talks to an embedding API (the fine-tuned encoder is served out of
//! process) and validates the returned vectors. Transient failures are
//! retried with exponential backoff; everything that survives the retries
//! becomes `EmbeddingUnavailable` for the fallback stage to absorb.

use crate::config::EmbeddingConfig;
use crate::embeddings::EmbeddingService;
use crate::error::{MentorError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Maximum retry attempts for rate limiting and timeouts
const MAX_RETRIES: usize = 3;

/// Backoff base duration in milliseconds
const BACKOFF_BASE_MS: u64 = 500;

/// Embedding API client
pub struct RemoteEmbeddingService {
    client: Client,
    config: EmbeddingConfig,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    input: Vec<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl RemoteEmbeddingService {
    /// Create a new embedding client from validated configuration
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MentorError::EmbeddingUnavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Call the API with retry logic for rate limiting and timeouts
    async fn call_api_with_retry(&self, text: &str) -> Result<Vec<f32>> {
        let mut retries = 0;

        loop {
            match self.call_api(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    if retries >= MAX_RETRIES || !Self::is_retryable(&e) {
                        return Err(e);
                    }

                    let backoff_ms = BACKOFF_BASE_MS * 2_u64.pow(retries as u32);
                    warn!(
                        "embedding request failed, retrying after {}ms (attempt {}/{}): {}",
                        backoff_ms,
                        retries + 1,
                        MAX_RETRIES,
                        e
                    );

                    sleep(Duration::from_millis(backoff_ms)).await;
                    retries += 1;
                }
            }
        }
    }

    fn is_retryable(err: &MentorError) -> bool {
        match err {
            MentorError::EmbeddingUnavailable(msg) => {
                msg.contains("rate limit") || msg.contains("timed out")
            }
            _ => false,
        }
    }

    /// Call the API once (no retry)
    async fn call_api(&self, text: &str) -> Result<Vec<f32>> {
        debug!(model = %self.config.model, "requesting embedding");

        let request = EmbedRequest {
            input: vec![text.to_string()],
            model: self.config.model.clone(),
        };

        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Content-Type", "application/json");

        if let Some(key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.json(&request).send().await.map_err(|e| {
            if e.is_timeout() {
                MentorError::EmbeddingUnavailable(format!(
                    "request timed out after {}s",
                    self.config.timeout_secs
                ))
            } else {
                MentorError::EmbeddingUnavailable(e.to_string())
            }
        })?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let parsed = response.json::<EmbedResponse>().await.map_err(|e| {
                    MentorError::EmbeddingUnavailable(format!("malformed response: {}", e))
                })?;

                let embedding = parsed
                    .data
                    .into_iter()
                    .next()
                    .map(|d| d.embedding)
                    .ok_or_else(|| {
                        MentorError::EmbeddingUnavailable("empty response from API".to_string())
                    })?;

                self.validate_embedding(&embedding)?;
                Ok(embedding)
            }
            StatusCode::TOO_MANY_REQUESTS => Err(MentorError::EmbeddingUnavailable(
                "rate limit exceeded".to_string(),
            )),
            _ => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                Err(MentorError::EmbeddingUnavailable(format!(
                    "API error (status {}): {}",
                    status, body
                )))
            }
        }
    }

    /// Validate embedding shape and values
    fn validate_embedding(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.config.dimensions {
            return Err(MentorError::EmbeddingUnavailable(format!(
                "expected {} dimensions, got {}",
                self.config.dimensions,
                embedding.len()
            )));
        }

        if embedding.iter().any(|&x| !x.is_finite()) {
            return Err(MentorError::EmbeddingUnavailable(
                "embedding contains non-finite values".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl EmbeddingService for RemoteEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(MentorError::EmbeddingUnavailable(
                "cannot embed empty text".to_string(),
            ));
        }

        self.call_api_with_retry(text).await
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
