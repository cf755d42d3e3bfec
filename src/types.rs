//! Core data types for the Mentor diagnosis engine
//!
//! This module defines the fundamental data structures used throughout mentor:
//! error reports, the closed set of classification kinds, diagnoses, and the
//! module-completion event handed to notification consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the captured error text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSource {
    /// Extracted from a screenshot via OCR
    Ocr,
    /// Pasted or piped in directly
    Direct,
}

/// A captured error message awaiting diagnosis
///
/// Created per diagnosis request and discarded after classification.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub raw_text: String,
    pub source: ErrorSource,
}

impl ErrorReport {
    /// Report built from OCR output
    pub fn ocr(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            source: ErrorSource::Ocr,
        }
    }

    /// Report built from directly supplied text
    pub fn direct(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            source: ErrorSource::Direct,
        }
    }
}

/// The `(object type, attribute name)` pair extracted from an attribute error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRef {
    pub object: String,
    pub attribute: String,
}

/// Closed set of error categories a report can be classified into
///
/// Exactly one kind is assigned per report. Detail payloads are substrings
/// extracted from the error text, present only when the matching pattern
/// captured them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    FileNotFound,
    InvalidValue { detail: Option<String> },
    MissingImport,
    MissingKey { key: Option<String> },
    MissingAttribute { detail: Option<AttributeRef> },
    SyntaxProblem { detail: Option<String> },
    UndefinedName { name: Option<String> },
    IndentationProblem { detail: Option<String> },
    UnexpectedEnd,
    MlPredicted { task_label: String },
    Unknown,
}

impl ErrorKind {
    /// Catalog key for this kind, ignoring any detail payload
    pub fn key(&self) -> &'static str {
        match self {
            ErrorKind::FileNotFound => "file_not_found",
            ErrorKind::InvalidValue { .. } => "invalid_value",
            ErrorKind::MissingImport => "missing_import",
            ErrorKind::MissingKey { .. } => "missing_key",
            ErrorKind::MissingAttribute { .. } => "missing_attribute",
            ErrorKind::SyntaxProblem { .. } => "syntax_problem",
            ErrorKind::UndefinedName { .. } => "undefined_name",
            ErrorKind::IndentationProblem { .. } => "indentation_problem",
            ErrorKind::UnexpectedEnd => "unexpected_end",
            ErrorKind::MlPredicted { .. } => "ml_predicted",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::FileNotFound => write!(f, "FileNotFoundError"),
            ErrorKind::InvalidValue { detail: Some(d) } => {
                write!(f, "ValueError: invalid input '{}'", d)
            }
            ErrorKind::InvalidValue { detail: None } => write!(f, "ValueError"),
            ErrorKind::MissingImport => write!(f, "ImportError"),
            ErrorKind::MissingKey { key: Some(k) } => {
                write!(f, "KeyError: missing key '{}'", k)
            }
            ErrorKind::MissingKey { key: None } => write!(f, "KeyError"),
            ErrorKind::MissingAttribute { detail: Some(d) } => {
                write!(
                    f,
                    "AttributeError: '{}' object missing attribute '{}'",
                    d.object, d.attribute
                )
            }
            ErrorKind::MissingAttribute { detail: None } => write!(f, "AttributeError"),
            ErrorKind::SyntaxProblem { detail: Some(d) } => write!(f, "SyntaxError: {}", d),
            ErrorKind::SyntaxProblem { detail: None } => write!(f, "SyntaxError"),
            ErrorKind::UndefinedName { name: Some(n) } => {
                write!(f, "NameError: name '{}' is not defined", n)
            }
            ErrorKind::UndefinedName { name: None } => write!(f, "NameError"),
            ErrorKind::IndentationProblem { detail: Some(d) } => {
                write!(f, "IndentationError: {}", d)
            }
            ErrorKind::IndentationProblem { detail: None } => write!(f, "IndentationError"),
            ErrorKind::UnexpectedEnd => write!(f, "unexpected EOF while parsing"),
            ErrorKind::MlPredicted { task_label } => {
                write!(f, "predicted task '{}'", task_label)
            }
            ErrorKind::Unknown => write!(f, "Unknown Error"),
        }
    }
}

/// Reference to a curriculum task and the module that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub module_name: String,
    pub task_name: String,
}

/// The result of one diagnosis call: classification, remediation steps, and
/// the curriculum task the learner should revisit (when one is known)
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub classification: ErrorKind,
    pub remediation: Vec<String>,
    pub task: Option<TaskRef>,
}

/// Summary of the module that follows a completed one, in curriculum order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextModuleInfo {
    pub module_name: String,
    pub short_explanation: String,
}

/// Emitted when every task in a module is marked complete
///
/// Transient; constructed by the progress tracker and handed to the
/// notification consumer. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleCompletionEvent {
    pub module_name: String,
    pub short_explanation: String,
    pub reward: String,
    pub difficulty: String,
    /// Asset reference for notification media (playback is the consumer's job)
    pub notification_asset: Option<String>,
    pub next_module: Option<NextModuleInfo>,
    pub completed_at: DateTime<Utc>,
}
