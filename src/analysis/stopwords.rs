//! Stopword lists for text normalization.

use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Default English stop words list.
///
/// Common English words that carry no signal for classification and are
/// dropped during normalization.
pub const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Default English stop words as an ordered set.
pub static DEFAULT_ENGLISH_STOP_WORDS_SET: LazyLock<BTreeSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .map(|&s| s.to_string())
        .collect()
});
