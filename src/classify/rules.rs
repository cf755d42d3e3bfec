//! Fixed-priority rule-based classifier
//!
//! Each detector triggers on a literal marker substring and extracts its
//! detail payload with a regex where the error format carries one. Priority
//! order matters: a wrapped traceback can contain several marker-like
//! tokens, and first-match-wins keeps the outcome deterministic. This stage
//! completes in bounded time and never invokes the learned model.

use crate::classify::PatternMatcher;
use crate::types::{AttributeRef, ErrorKind};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static INT_LITERAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"invalid literal for int\(\) with base 10: '(.*?)'").expect("valid regex")
});
static KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"KeyError: '(.*?)'").expect("valid regex"));
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"AttributeError: '(.*?)' object has no attribute '(.*?)'").expect("valid regex")
});
static SYNTAX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"SyntaxError: (.+)").expect("valid regex"));
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"NameError: name '(.+?)' is not defined").expect("valid regex"));
static INDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"IndentationError: (.+)").expect("valid regex"));

struct FileNotFoundRule;

impl PatternMatcher for FileNotFoundRule {
    fn name(&self) -> &'static str {
        "file_not_found"
    }

    fn try_match(&self, text: &str) -> Option<ErrorKind> {
        text.contains("FileNotFoundError").then_some(ErrorKind::FileNotFound)
    }
}

struct InvalidValueRule;

impl PatternMatcher for InvalidValueRule {
    fn name(&self) -> &'static str {
        "invalid_value"
    }

    fn try_match(&self, text: &str) -> Option<ErrorKind> {
        if !text.contains("ValueError:") {
            return None;
        }
        let detail = INT_LITERAL_RE
            .captures(text)
            .map(|caps| caps[1].to_string());
        Some(ErrorKind::InvalidValue { detail })
    }
}

struct MissingImportRule;

impl PatternMatcher for MissingImportRule {
    fn name(&self) -> &'static str {
        "missing_import"
    }

    fn try_match(&self, text: &str) -> Option<ErrorKind> {
        (text.contains("ImportError") || text.contains("ModuleNotFoundError"))
            .then_some(ErrorKind::MissingImport)
    }
}

struct MissingKeyRule;

impl PatternMatcher for MissingKeyRule {
    fn name(&self) -> &'static str {
        "missing_key"
    }

    fn try_match(&self, text: &str) -> Option<ErrorKind> {
        if !text.contains("KeyError") {
            return None;
        }
        let key = KEY_RE.captures(text).map(|caps| caps[1].to_string());
        Some(ErrorKind::MissingKey { key })
    }
}

struct MissingAttributeRule;

impl PatternMatcher for MissingAttributeRule {
    fn name(&self) -> &'static str {
        "missing_attribute"
    }

    fn try_match(&self, text: &str) -> Option<ErrorKind> {
        if !text.contains("AttributeError") {
            return None;
        }
        let detail = ATTR_RE.captures(text).map(|caps| AttributeRef {
            object: caps[1].to_string(),
            attribute: caps[2].to_string(),
        });
        Some(ErrorKind::MissingAttribute { detail })
    }
}

struct SyntaxRule;

impl PatternMatcher for SyntaxRule {
    fn name(&self) -> &'static str {
        "syntax_problem"
    }

    fn try_match(&self, text: &str) -> Option<ErrorKind> {
        if !text.contains("SyntaxError") {
            return None;
        }
        let detail = SYNTAX_RE
            .captures(text)
            .map(|caps| caps[1].trim().to_string());
        Some(ErrorKind::SyntaxProblem { detail })
    }
}

struct UndefinedNameRule;

impl PatternMatcher for UndefinedNameRule {
    fn name(&self) -> &'static str {
        "undefined_name"
    }

    fn try_match(&self, text: &str) -> Option<ErrorKind> {
        if !text.contains("NameError") {
            return None;
        }
        let name = NAME_RE.captures(text).map(|caps| caps[1].to_string());
        Some(ErrorKind::UndefinedName { name })
    }
}

struct IndentationRule;

impl PatternMatcher for IndentationRule {
    fn name(&self) -> &'static str {
        "indentation_problem"
    }

    fn try_match(&self, text: &str) -> Option<ErrorKind> {
        if !text.contains("IndentationError") {
            return None;
        }
        let detail = INDENT_RE
            .captures(text)
            .map(|caps| caps[1].trim().to_string());
        Some(ErrorKind::IndentationProblem { detail })
    }
}

struct UnexpectedEndRule;

impl PatternMatcher for UnexpectedEndRule {
    fn name(&self) -> &'static str {
        "unexpected_end"
    }

    fn try_match(&self, text: &str) -> Option<ErrorKind> {
        text.contains("unexpected EOF while parsing")
            .then_some(ErrorKind::UnexpectedEnd)
    }
}

/// The ordered detector list; highest priority first
pub struct RuleSet {
    matchers: Vec<Box<dyn PatternMatcher>>,
}

impl RuleSet {
    /// Standard detector ordering
    pub fn standard() -> Self {
        Self {
            matchers: vec![
                Box::new(FileNotFoundRule),
                Box::new(InvalidValueRule),
                Box::new(MissingImportRule),
                Box::new(MissingKeyRule),
                Box::new(MissingAttributeRule),
                Box::new(SyntaxRule),
                Box::new(UndefinedNameRule),
                Box::new(IndentationRule),
                Box::new(UnexpectedEndRule),
            ],
        }
    }

    /// Run the detectors in order; `None` means unresolved (the fallback
    /// stage decides between a prediction and Unknown)
    pub fn classify(&self, text: &str) -> Option<ErrorKind> {
        for matcher in &self.matchers {
            if let Some(kind) = matcher.try_match(text) {
                debug!(rule = matcher.name(), "pattern matched");
                return Some(kind);
            }
        }
        None
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Option<ErrorKind> {
        RuleSet::standard().classify(text)
    }

    #[test]
    fn test_file_not_found_amid_noise() {
        let text = "Traceback (most recent call last): ... FileNotFoundError: [Errno 2] No such file or directory: 'data.csv'";
        assert_eq!(classify(text), Some(ErrorKind::FileNotFound));
    }

    #[test]
    fn test_invalid_value_with_detail() {
        let text = "ValueError: invalid literal for int() with base 10: 'abc'";
        assert_eq!(
            classify(text),
            Some(ErrorKind::InvalidValue {
                detail: Some("abc".to_string())
            })
        );
    }

    #[test]
    fn test_invalid_value_without_detail() {
        let text = "ValueError: could not convert string to float";
        assert_eq!(classify(text), Some(ErrorKind::InvalidValue { detail: None }));
    }

    #[test]
    fn test_missing_import_markers() {
        assert_eq!(
            classify("ImportError: cannot import name 'foo'"),
            Some(ErrorKind::MissingImport)
        );
        assert_eq!(
            classify("ModuleNotFoundError: No module named 'numpy'"),
            Some(ErrorKind::MissingImport)
        );
    }

    #[test]
    fn test_missing_key_detail() {
        assert_eq!(
            classify("KeyError: 'token'"),
            Some(ErrorKind::MissingKey {
                key: Some("token".to_string())
            })
        );
        assert_eq!(
            classify("raised KeyError somewhere"),
            Some(ErrorKind::MissingKey { key: None })
        );
    }

    #[test]
    fn test_missing_attribute_pair() {
        let text = "AttributeError: 'Foo' object has no attribute 'bar'";
        assert_eq!(
            classify(text),
            Some(ErrorKind::MissingAttribute {
                detail: Some(AttributeRef {
                    object: "Foo".to_string(),
                    attribute: "bar".to_string()
                })
            })
        );
    }

    #[test]
    fn test_syntax_and_friends() {
        assert_eq!(
            classify("SyntaxError: invalid syntax"),
            Some(ErrorKind::SyntaxProblem {
                detail: Some("invalid syntax".to_string())
            })
        );
        assert_eq!(
            classify("NameError: name 'x' is not defined"),
            Some(ErrorKind::UndefinedName {
                name: Some("x".to_string())
            })
        );
        assert_eq!(
            classify("IndentationError: unexpected indent"),
            Some(ErrorKind::IndentationProblem {
                detail: Some("unexpected indent".to_string())
            })
        );
        assert_eq!(
            classify("SyntaxError: unexpected EOF while parsing"),
            // SyntaxError outranks the bare EOF marker
            Some(ErrorKind::SyntaxProblem {
                detail: Some("unexpected EOF while parsing".to_string())
            })
        );
        assert_eq!(
            classify("unexpected EOF while parsing"),
            Some(ErrorKind::UnexpectedEnd)
        );
    }

    #[test]
    fn test_priority_first_match_wins() {
        // Both markers present; FileNotFound has higher priority
        let text = "FileNotFoundError while handling KeyError: 'x'";
        assert_eq!(classify(text), Some(ErrorKind::FileNotFound));
    }

    #[test]
    fn test_unresolved_is_none() {
        assert_eq!(classify("Segmentation fault (core dumped)"), None);
        assert_eq!(classify(""), None);
    }
}
