//! Embedding fallback classifier
//!
//! Invoked only when every pattern matcher declines. The text is embedded by
//! the external service and handed to the trained classifier; the whole path
//! runs under one timeout. Any failure degrades the classification to
//! `Unknown` so the pipeline always terminates with a result.

use crate::config::FallbackConfig;
use crate::embeddings::EmbeddingService;
use crate::error::{MentorError, Result};
use crate::model::TaskModel;
use crate::types::ErrorKind;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, warn};

/// Adapter over the embedding service and the trained classifier
pub struct FallbackClassifier {
    embeddings: Arc<dyn EmbeddingService>,
    model: Arc<dyn TaskModel>,
    confidence_threshold: f32,
    timeout: Duration,
}

impl FallbackClassifier {
    pub fn new(
        embeddings: Arc<dyn EmbeddingService>,
        model: Arc<dyn TaskModel>,
        config: &FallbackConfig,
    ) -> Self {
        if embeddings.dimensions() != model.dimensions() {
            warn!(
                embedding = embeddings.dimensions(),
                model = model.dimensions(),
                "embedding and model dimensions disagree; predictions will fail"
            );
        }

        Self {
            embeddings,
            model,
            confidence_threshold: config.confidence_threshold,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Classify unresolved text. Never fails: embedding or model trouble
    /// yields `Unknown`, with the cause logged. Failures outside the
    /// fallback taxonomy also degrade, but are logged as errors since they
    /// point at a wiring problem rather than a flaky collaborator.
    pub async fn classify(&self, text: &str) -> ErrorKind {
        match self.try_classify(text).await {
            Ok(kind) => kind,
            Err(e) if e.is_recoverable_fallback() => {
                warn!("fallback classification degraded to Unknown: {}", e);
                ErrorKind::Unknown
            }
            Err(e) => {
                error!("unexpected failure in fallback classification: {}", e);
                ErrorKind::Unknown
            }
        }
    }

    async fn try_classify(&self, text: &str) -> Result<ErrorKind> {
        let embedding = timeout(self.timeout, self.embeddings.embed(text))
            .await
            .map_err(|_| {
                MentorError::EmbeddingUnavailable(format!(
                    "fallback timed out after {:?}",
                    self.timeout
                ))
            })??;

        let prediction = self.model.predict(&embedding)?;
        debug!(
            task = %prediction.task_label,
            confidence = prediction.confidence,
            "fallback prediction"
        );

        if prediction.confidence < self.confidence_threshold {
            debug!(
                threshold = self.confidence_threshold,
                "prediction below confidence threshold"
            );
            return Ok(ErrorKind::Unknown);
        }

        Ok(ErrorKind::MlPredicted {
            task_label: prediction.task_label,
        })
    }
}
