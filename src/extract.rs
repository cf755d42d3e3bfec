//! Text extraction from screenshots
//!
//! OCR is an external collaborator: the engine consumes extracted text and
//! treats the extractor as a black box. The default implementation shells
//! out to the Tesseract CLI. Any failure (missing file, missing binary,
//! non-zero exit) is `ExtractionFailure`, which aborts the diagnosis with no
//! classification.

use crate::error::{MentorError, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Extracts error text from a captured image
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, image: &Path) -> Result<String>;
}

/// Tesseract CLI wrapper
pub struct TesseractExtractor {
    command: String,
}

impl TesseractExtractor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for TesseractExtractor {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl TextExtractor for TesseractExtractor {
    async fn extract_text(&self, image: &Path) -> Result<String> {
        if !image.exists() {
            return Err(MentorError::Extraction(format!(
                "image not found: {}",
                image.display()
            )));
        }

        debug!(image = %image.display(), "running OCR");

        let output = Command::new(&self.command)
            .arg(image)
            .arg("stdout")
            .output()
            .await
            .map_err(|e| {
                MentorError::Extraction(format!("failed to run {}: {}", self.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MentorError::Extraction(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
