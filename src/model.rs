//! Trained task classifier for the fallback stage
//!
//! The classifier is produced by an offline training pipeline and consumed
//! here as an artifact: a linear head exported to JSON (per-label weight
//! rows and biases over the embedding space). Loading happens once at
//! startup; `ModelUnavailable` at that point disables the fallback stage.

use crate::error::{MentorError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// A fallback prediction: the curriculum task label and the softmax
/// probability behind it
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub task_label: String,
    pub confidence: f32,
}

/// Maps an embedding vector to a curriculum task label
pub trait TaskModel: Send + Sync {
    /// Predict the task for an embedding; `PredictionFailure` on malformed input
    fn predict(&self, vector: &[f32]) -> Result<Prediction>;

    /// Expected input dimensionality
    fn dimensions(&self) -> usize;
}

/// Exported classifier head: one weight row and bias per label
#[derive(Debug, Deserialize)]
struct ModelArtifact {
    labels: Vec<String>,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    dimensions: usize,
}

/// Linear classifier loaded from a JSON artifact
#[derive(Debug)]
pub struct LinearTaskClassifier {
    artifact: ModelArtifact,
}

impl LinearTaskClassifier {
    /// Load and shape-check the artifact
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            MentorError::ModelUnavailable(format!("{}: {}", path.display(), e))
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&raw).map_err(|e| {
            MentorError::ModelUnavailable(format!("malformed artifact {}: {}", path.display(), e))
        })?;

        Self::validate(&artifact)?;
        info!(
            labels = artifact.labels.len(),
            dimensions = artifact.dimensions,
            "classifier artifact loaded"
        );
        Ok(Self { artifact })
    }

    fn validate(artifact: &ModelArtifact) -> Result<()> {
        if artifact.labels.is_empty() {
            return Err(MentorError::ModelUnavailable(
                "artifact defines no labels".to_string(),
            ));
        }
        if artifact.weights.len() != artifact.labels.len()
            || artifact.bias.len() != artifact.labels.len()
        {
            return Err(MentorError::ModelUnavailable(format!(
                "artifact shape mismatch: {} labels, {} weight rows, {} biases",
                artifact.labels.len(),
                artifact.weights.len(),
                artifact.bias.len()
            )));
        }
        if let Some(row) = artifact
            .weights
            .iter()
            .find(|row| row.len() != artifact.dimensions)
        {
            return Err(MentorError::ModelUnavailable(format!(
                "weight row has {} columns, expected {}",
                row.len(),
                artifact.dimensions
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn from_parts(labels: Vec<String>, weights: Vec<Vec<f32>>, bias: Vec<f32>, dimensions: usize) -> Self {
        Self {
            artifact: ModelArtifact {
                labels,
                weights,
                bias,
                dimensions,
            },
        }
    }
}

impl TaskModel for LinearTaskClassifier {
    fn predict(&self, vector: &[f32]) -> Result<Prediction> {
        if vector.len() != self.artifact.dimensions {
            return Err(MentorError::PredictionFailure(format!(
                "input has {} dimensions, model expects {}",
                vector.len(),
                self.artifact.dimensions
            )));
        }
        if vector.iter().any(|&x| !x.is_finite()) {
            return Err(MentorError::PredictionFailure(
                "input contains non-finite values".to_string(),
            ));
        }

        let scores: Vec<f32> = self
            .artifact
            .weights
            .iter()
            .zip(&self.artifact.bias)
            .map(|(row, b)| row.iter().zip(vector).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect();

        // Softmax, shifted by the max score for numeric stability
        let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f32 = exps.iter().sum();

        let (best_idx, best_exp) = exps
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .ok_or_else(|| MentorError::PredictionFailure("no scores computed".to_string()))?;

        Ok(Prediction {
            task_label: self.artifact.labels[best_idx].clone(),
            confidence: best_exp / total,
        })
    }

    fn dimensions(&self) -> usize {
        self.artifact.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_label_model() -> LinearTaskClassifier {
        // First label fires on a positive x[0], second on a positive x[1]
        LinearTaskClassifier::from_parts(
            vec!["loops_basics".into(), "dict_access".into()],
            vec![vec![2.0, 0.0], vec![0.0, 2.0]],
            vec![0.0, 0.0],
            2,
        )
    }

    #[test]
    fn test_predict_argmax() {
        let model = two_label_model();
        let prediction = model.predict(&[1.0, 0.0]).unwrap();
        assert_eq!(prediction.task_label, "loops_basics");
        assert!(prediction.confidence > 0.5);

        let prediction = model.predict(&[0.0, 1.0]).unwrap();
        assert_eq!(prediction.task_label, "dict_access");
    }

    #[test]
    fn test_confidence_sums_to_one_for_two_labels() {
        let model = two_label_model();
        let prediction = model.predict(&[0.0, 0.0]).unwrap();
        // Equal scores: the winner holds exactly half the mass
        assert!((prediction.confidence - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_classifier_is_debuggable() {
        // Error-path assertions format the classifier, so Debug must hold
        let rendered = format!("{:?}", two_label_model());
        assert!(rendered.contains("LinearTaskClassifier"));
    }

    #[test]
    fn test_wrong_dimensions_rejected() {
        let model = two_label_model();
        let err = model.predict(&[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, MentorError::PredictionFailure(_)));
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let model = two_label_model();
        let err = model.predict(&[f32::NAN, 0.0]).unwrap_err();
        assert!(matches!(err, MentorError::PredictionFailure(_)));
    }

    #[test]
    fn test_load_missing_artifact() {
        let err = LinearTaskClassifier::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, MentorError::ModelUnavailable(_)));
    }

    #[test]
    fn test_load_valid_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{
                "labels": ["loops_basics"],
                "weights": [[0.1, 0.2, 0.3]],
                "bias": [0.0],
                "dimensions": 3
            }"#,
        )
        .unwrap();

        let model = LinearTaskClassifier::load(&path).unwrap();
        assert_eq!(model.dimensions(), 3);
        let prediction = model.predict(&[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(prediction.task_label, "loops_basics");
        // Single label: softmax is trivially certain
        assert!((prediction.confidence - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_load_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{
                "labels": ["a", "b"],
                "weights": [[0.1]],
                "bias": [0.0, 0.0],
                "dimensions": 1
            }"#,
        )
        .unwrap();

        let err = LinearTaskClassifier::load(&path).unwrap_err();
        assert!(matches!(err, MentorError::ModelUnavailable(_)));
    }
}
