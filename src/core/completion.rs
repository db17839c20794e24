//! Tab completion against a static vocabulary
//!
//! The vocabulary is read-only configuration data shared by every session.
//! Matching is an exact, case-sensitive prefix comparison; candidates keep
//! their vocabulary order (no ranking, no fuzzy matching).

/// Completion engine over a fixed vocabulary
pub struct CompletionEngine {
    vocabulary: Vec<String>,
}

impl CompletionEngine {
    /// Build an engine from a vocabulary list, order preserved
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocabulary: vocabulary.into_iter().map(Into::into).collect(),
        }
    }

    /// Every vocabulary entry starting with `prefix`, in vocabulary order
    pub fn candidates(&self, prefix: &str) -> Vec<&str> {
        self.vocabulary
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    /// Number of vocabulary entries
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Whether the vocabulary is empty
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}
