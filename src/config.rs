//! Configuration for the Mentor engine
//!
//! Settings are loaded through the `config` crate from an optional TOML file
//! plus `MENTOR_`-prefixed environment variable overrides, then validated.
//! All components receive their configuration explicitly at construction;
//! nothing is read from ambient globals after startup.

use crate::error::Result;
use crate::progress::CompletionPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MentorConfig {
    /// Curriculum file (module name -> steps/explanation/reward/difficulty)
    pub curriculum_path: PathBuf,

    /// Progress snapshot file, owned and rewritten by the tracker
    pub progress_path: PathBuf,

    /// Optional solution catalog override; the built-in table is used when absent
    pub catalog_path: Option<PathBuf>,

    /// Trained classifier artifact for the fallback stage
    pub model_path: Option<PathBuf>,

    pub embedding: EmbeddingConfig,
    pub fallback: FallbackConfig,

    /// Whether a fully-complete module re-fires its completion event on
    /// every subsequent mark
    pub completion_policy: CompletionPolicy,
}

impl Default for MentorConfig {
    fn default() -> Self {
        Self {
            curriculum_path: PathBuf::from("tasks.json"),
            progress_path: default_data_dir().join("progress.json"),
            catalog_path: None,
            model_path: None,
            embedding: EmbeddingConfig::default(),
            fallback: FallbackConfig::default(),
            completion_policy: CompletionPolicy::default(),
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding HTTP API
    pub base_url: String,

    /// Bearer token, if the service requires one
    pub api_key: Option<String>,

    /// Model name sent with each request
    pub model: String,

    /// Expected embedding dimensionality
    pub dimensions: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8601/v1".to_string(),
            api_key: None,
            model: "bert-error-embed".to_string(),
            dimensions: 768,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(config::ConfigError::Message(
                "embedding.base_url cannot be empty".to_string(),
            )
            .into());
        }
        if self.model.is_empty() {
            return Err(config::ConfigError::Message(
                "embedding.model cannot be empty".to_string(),
            )
            .into());
        }
        if self.dimensions == 0 {
            return Err(config::ConfigError::Message(
                "embedding.dimensions must be positive".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// Fallback classifier tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Disable to skip the learned model entirely; unresolved reports then
    /// classify as Unknown
    pub enabled: bool,

    /// Predictions below this confidence classify as Unknown. The default 0.0
    /// preserves the always-predict behavior of the original pipeline.
    pub confidence_threshold: f32,

    /// Overall timeout for the embed-then-predict path, in seconds. On expiry
    /// the classification degrades to Unknown.
    pub timeout_secs: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_threshold: 0.0,
            timeout_secs: 10,
        }
    }
}

impl FallbackConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(config::ConfigError::Message(format!(
                "fallback.confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            ))
            .into());
        }
        if self.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "fallback.timeout_secs must be positive".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

impl MentorConfig {
    /// Load configuration from an optional file plus environment overrides.
    ///
    /// When `path` is None, `mentor.toml` in the working directory is used
    /// if present. `MENTOR_`-prefixed environment variables override file
    /// values (e.g. `MENTOR_FALLBACK__TIMEOUT_SECS=5`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        builder = match path {
            Some(p) => builder.add_source(config::File::from(p)),
            None => builder.add_source(config::File::with_name("mentor").required(false)),
        };

        let cfg: MentorConfig = builder
            .add_source(config::Environment::with_prefix("MENTOR").separator("__"))
            .build()?
            .try_deserialize()?;

        cfg.validate()?;
        debug!(
            curriculum = %cfg.curriculum_path.display(),
            progress = %cfg.progress_path.display(),
            "configuration loaded"
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.embedding.validate()?;
        self.fallback.validate()?;
        Ok(())
    }
}

/// Per-user data directory, following the platform convention
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mentor")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let cfg = MentorConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.fallback.enabled);
        assert_eq!(cfg.fallback.confidence_threshold, 0.0);
    }

    #[test]
    fn test_threshold_bounds() {
        let mut fallback = FallbackConfig::default();
        fallback.confidence_threshold = 1.5;
        assert!(fallback.validate().is_err());

        fallback.confidence_threshold = 0.6;
        assert!(fallback.validate().is_ok());
    }

    #[test]
    fn test_embedding_validation() {
        let mut embedding = EmbeddingConfig::default();
        assert!(embedding.validate().is_ok());

        embedding.dimensions = 0;
        assert!(embedding.validate().is_err());

        embedding = EmbeddingConfig::default();
        embedding.base_url.clear();
        assert!(embedding.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mentor.toml");
        std::fs::write(
            &path,
            r#"
curriculum_path = "custom_tasks.json"

[fallback]
confidence_threshold = 0.35
timeout_secs = 5
"#,
        )
        .unwrap();

        let cfg = MentorConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.curriculum_path, PathBuf::from("custom_tasks.json"));
        assert!((cfg.fallback.confidence_threshold - 0.35).abs() < 1e-6);
        assert_eq!(cfg.fallback.timeout_secs, 5);
        // Untouched sections keep their defaults
        assert_eq!(cfg.embedding.dimensions, 768);
    }
}
