//! Two-tier error classification
//!
//! Classification runs a fixed-priority list of pattern matchers first
//! (`rules`); when none match, the learned fallback (`fallback`) embeds the
//! text and predicts a curriculum task. Pattern matching never fails and
//! never touches the model.

pub mod fallback;
pub mod rules;

pub use fallback::FallbackClassifier;
pub use rules::RuleSet;

use crate::types::ErrorKind;

/// A single deterministic detector in the priority list
///
/// Implementations search for their marker substring (and optional detail
/// pattern) in the normalized text. Returning `None` means "not mine", not
/// an error.
pub trait PatternMatcher: Send + Sync {
    /// Detector name, for trace logs
    fn name(&self) -> &'static str;

    /// Attempt to classify; first matcher to return `Some` wins
    fn try_match(&self, text: &str) -> Option<ErrorKind>;
}
