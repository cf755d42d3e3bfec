//! Embedding generation for the fallback classifier
//!
//! The embedding service is an external collaborator: text in, fixed-length
//! vector out. Failures surface as `EmbeddingUnavailable` and are recovered
//! by the fallback stage, never by callers of `diagnose`.

pub mod remote;

pub use remote::RemoteEmbeddingService;

use crate::error::Result;
use async_trait::async_trait;

/// Embedding service trait defining required operations
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generate the embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embedding dimensionality
    fn dimensions(&self) -> usize;

    /// Model name
    fn model_name(&self) -> &str;
}
