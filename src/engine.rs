//! Diagnosis pipeline
//!
//! One entry point ties the stages together: normalize, run the pattern
//! matchers, fall back to the learned classifier when they all decline, then
//! map the classification to remediation steps and (for predicted kinds) a
//! curriculum task. Diagnosis is total: malformed or unrecognized input
//! yields `Unknown` with the default remediation, never an error.

use crate::catalog::SolutionCatalog;
use crate::classify::{FallbackClassifier, RuleSet};
use crate::curriculum::Curriculum;
use crate::normalize::normalize;
use crate::types::{Diagnosis, ErrorKind, ErrorReport, TaskRef};
use std::sync::Arc;
use tracing::debug;

/// The error diagnosis engine
///
/// Constructed once at startup with its collaborators injected; holds no
/// mutable state.
pub struct DiagnosisEngine {
    rules: RuleSet,
    fallback: Option<FallbackClassifier>,
    catalog: SolutionCatalog,
    curriculum: Arc<Curriculum>,
}

impl DiagnosisEngine {
    pub fn new(
        catalog: SolutionCatalog,
        curriculum: Arc<Curriculum>,
        fallback: Option<FallbackClassifier>,
    ) -> Self {
        Self {
            rules: RuleSet::standard(),
            fallback,
            catalog,
            curriculum,
        }
    }

    /// Diagnose a captured error report
    pub async fn diagnose(&self, report: ErrorReport) -> Diagnosis {
        let text = normalize(&report.raw_text);

        let classification = match self.rules.classify(&text) {
            Some(kind) => kind,
            None => match &self.fallback {
                Some(fallback) => fallback.classify(&text).await,
                None => {
                    debug!("no pattern matched and no fallback configured");
                    ErrorKind::Unknown
                }
            },
        };

        let (remediation, task) = self.resolve(&classification);
        debug!(
            source = ?report.source,
            classification = %classification,
            "diagnosis complete"
        );

        Diagnosis {
            classification,
            remediation,
            task,
        }
    }

    /// Map a classification to remediation steps and, for predicted kinds,
    /// the curriculum task behind the label
    pub fn resolve(&self, classification: &ErrorKind) -> (Vec<String>, Option<TaskRef>) {
        let steps = self.catalog.steps_for(classification).to_vec();

        let task = match classification {
            ErrorKind::MlPredicted { task_label } => self.curriculum.find_task(task_label),
            _ => None,
        };

        (steps, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorSource;

    fn engine_without_fallback() -> DiagnosisEngine {
        DiagnosisEngine::new(
            SolutionCatalog::builtin(),
            Arc::new(Curriculum::default()),
            None,
        )
    }

    #[tokio::test]
    async fn test_rule_based_diagnosis() {
        let engine = engine_without_fallback();
        let diagnosis = engine
            .diagnose(ErrorReport::direct("KeyError: 'token'"))
            .await;

        assert_eq!(
            diagnosis.classification,
            ErrorKind::MissingKey {
                key: Some("token".to_string())
            }
        );
        assert!(!diagnosis.remediation.is_empty());
        assert!(diagnosis.task.is_none());
    }

    #[tokio::test]
    async fn test_ocr_noise_normalized_before_matching() {
        let engine = engine_without_fallback();
        let report = ErrorReport {
            raw_text: "Traceback:\nﬁle check failed\nFileNotFoundError: 'x'\n".to_string(),
            source: ErrorSource::Ocr,
        };

        let diagnosis = engine.diagnose(report).await;
        assert_eq!(diagnosis.classification, ErrorKind::FileNotFound);
    }

    #[tokio::test]
    async fn test_unresolved_without_fallback_is_unknown() {
        let engine = engine_without_fallback();
        let diagnosis = engine
            .diagnose(ErrorReport::direct("Segmentation fault (core dumped)"))
            .await;

        assert_eq!(diagnosis.classification, ErrorKind::Unknown);
        // Default remediation from the catalog, never empty
        assert!(!diagnosis.remediation.is_empty());
    }
}
