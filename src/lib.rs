//! Mentor - Error Diagnosis & Curriculum Progress Engine
//!
//! Mentor diagnoses a programming error from captured text, attaches a
//! remediation procedure, and links the diagnosis to a curriculum of
//! learning tasks whose completion is persisted across sessions.
//!
//! # Architecture
//!
//! The pipeline is layered:
//! - **Normalize**: collapse OCR line breaks and ligature damage
//! - **Classify**: fixed-priority pattern matchers, then the embedding
//!   fallback when none match
//! - **Resolve**: classification -> remediation steps + curriculum task
//! - **Progress**: per-task completion state machine with write-through
//!   JSON persistence and module-completion events
//!
//! # Example
//!
//! ```ignore
//! use mentor_core::{DiagnosisEngine, ErrorReport, SolutionCatalog};
//! use mentor_core::curriculum::Curriculum;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> mentor_core::Result<()> {
//!     let curriculum = Arc::new(Curriculum::load("tasks.json".as_ref())?);
//!     let engine = DiagnosisEngine::new(SolutionCatalog::builtin(), curriculum, None);
//!
//!     let diagnosis = engine.diagnose(ErrorReport::direct("KeyError: 'token'")).await;
//!     for step in &diagnosis.remediation {
//!         println!("{}", step);
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod classify;
pub mod config;
pub mod curriculum;
pub mod embeddings;
pub mod engine;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod progress;
pub mod types;

// Re-export commonly used types
pub use catalog::SolutionCatalog;
pub use classify::{FallbackClassifier, RuleSet};
pub use config::{EmbeddingConfig, FallbackConfig, MentorConfig};
pub use curriculum::{Curriculum, Module};
pub use embeddings::{EmbeddingService, RemoteEmbeddingService};
pub use engine::DiagnosisEngine;
pub use error::{MentorError, Result};
pub use extract::{TesseractExtractor, TextExtractor};
pub use model::{LinearTaskClassifier, Prediction, TaskModel};
pub use normalize::normalize;
pub use notify::{CompletionSink, LogSink};
pub use progress::{CompletionPolicy, ProgressStore, ProgressTracker};
pub use types::{
    Diagnosis, ErrorKind, ErrorReport, ErrorSource, ModuleCompletionEvent, NextModuleInfo, TaskRef,
};
