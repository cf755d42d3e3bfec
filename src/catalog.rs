//! Solution catalog: remediation steps per classification kind
//!
//! The catalog maps a kind key (detail payloads ignored) to an ordered list
//! of human-readable steps. A built-in table ships with the binary; a JSON
//! file can override it. Loaded once, read-only afterwards. The `unknown`
//! entry doubles as the designated default for kinds the catalog does not
//! name.

use crate::error::{MentorError, Result};
use crate::types::ErrorKind;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Kind key of the designated default entry
pub const DEFAULT_KEY: &str = "unknown";

/// Read-only mapping from kind key to ordered remediation steps
pub struct SolutionCatalog {
    entries: HashMap<String, Vec<String>>,
}

impl SolutionCatalog {
    /// The built-in remediation table
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();

        let mut add = |key: &str, steps: &[&str]| {
            entries.insert(
                key.to_string(),
                steps.iter().map(|s| s.to_string()).collect(),
            );
        };

        add(
            "file_not_found",
            &[
                "Step 1: Verify the file path is correct.",
                "Step 2: Ensure the file exists at the specified location.",
                "Step 3: Check read permissions for the file.",
            ],
        );
        add(
            "invalid_value",
            &[
                "Step 1: Confirm the input type matches the expected format.",
                "Step 2: If converting to int, ensure the string represents a valid integer.",
            ],
        );
        add(
            "missing_import",
            &[
                "Step 1: Ensure the required library is installed.",
                "Step 2: Use the command `pip install <library_name>`.",
            ],
        );
        add(
            "missing_key",
            &[
                "Step 1: Check if the specified key exists in the dictionary.",
                "Step 2: Handle missing keys using `dict.get('<key>')` or exception handling.",
            ],
        );
        add(
            "missing_attribute",
            &[
                "Step 1: Verify that you're calling the correct attribute or method on the object.",
                "Step 2: Ensure the object type matches the attribute/method you're trying to access.",
            ],
        );
        add(
            "syntax_problem",
            &[
                "Step 1: Check quoting and parentheses on the reported line.",
                "Step 2: Compare the line against the lesson's reference snippet.",
            ],
        );
        add(
            "undefined_name",
            &[
                "Step 1: Ensure the variable or function is defined before you reference it.",
                "Step 2: Check the spelling of the name.",
            ],
        );
        add(
            "indentation_problem",
            &[
                "Step 1: Verify your indentation level.",
                "Step 2: Ensure consistent use of spaces or tabs, not a mixture.",
            ],
        );
        add(
            "unexpected_end",
            &[
                "Step 1: Check for missing closing brackets or quotation marks.",
                "Step 2: Look for incomplete code constructs at the end of the file.",
            ],
        );
        add(
            "ml_predicted",
            &["Review the curriculum task this error was matched to and rework its exercise."],
        );
        add(
            DEFAULT_KEY,
            &[
                "The error is unrecognized. Please review the error message for details.",
                "You can consult documentation or research online for potential solutions.",
            ],
        );

        Self { entries }
    }

    /// Load a catalog override from a JSON file.
    ///
    /// The file must carry the `unknown` default entry; everything else is
    /// optional and falls through to the default at lookup time.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let entries: HashMap<String, Vec<String>> = serde_json::from_str(&raw)?;

        if !entries.contains_key(DEFAULT_KEY) {
            return Err(MentorError::Config(config::ConfigError::Message(format!(
                "solution catalog {} has no '{}' default entry",
                path.display(),
                DEFAULT_KEY
            ))));
        }

        info!(entries = entries.len(), path = %path.display(), "solution catalog loaded");
        Ok(Self { entries })
    }

    /// Remediation steps for a classification, ignoring its detail payload.
    /// Falls back to the default entry when the kind is not cataloged.
    pub fn steps_for(&self, kind: &ErrorKind) -> &[String] {
        self.entries
            .get(kind.key())
            .or_else(|| self.entries.get(DEFAULT_KEY))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for SolutionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_kind() {
        let catalog = SolutionCatalog::builtin();
        let kinds = [
            ErrorKind::FileNotFound,
            ErrorKind::InvalidValue { detail: None },
            ErrorKind::MissingImport,
            ErrorKind::MissingKey { key: None },
            ErrorKind::MissingAttribute { detail: None },
            ErrorKind::SyntaxProblem { detail: None },
            ErrorKind::UndefinedName { name: None },
            ErrorKind::IndentationProblem { detail: None },
            ErrorKind::UnexpectedEnd,
            ErrorKind::MlPredicted {
                task_label: "t".into(),
            },
            ErrorKind::Unknown,
        ];
        for kind in kinds {
            assert!(!catalog.steps_for(&kind).is_empty(), "no steps for {}", kind);
        }
    }

    #[test]
    fn test_detail_payload_ignored() {
        let catalog = SolutionCatalog::builtin();
        let with = catalog.steps_for(&ErrorKind::MissingKey {
            key: Some("token".into()),
        });
        let without = catalog.steps_for(&ErrorKind::MissingKey { key: None });
        assert_eq!(with, without);
    }

    #[test]
    fn test_uncataloged_kind_gets_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"unknown": ["Ask your instructor."], "file_not_found": ["Check the path."]}"#,
        )
        .unwrap();

        let catalog = SolutionCatalog::from_file(&path).unwrap();
        assert_eq!(
            catalog.steps_for(&ErrorKind::FileNotFound),
            ["Check the path.".to_string()]
        );
        // missing_key is absent from the override; default applies
        assert_eq!(
            catalog.steps_for(&ErrorKind::MissingKey { key: None }),
            ["Ask your instructor.".to_string()]
        );
    }

    #[test]
    fn test_override_without_default_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"file_not_found": ["Check the path."]}"#).unwrap();

        assert!(SolutionCatalog::from_file(&path).is_err());
    }
}
