//! The fixed normalization pipeline shared by training and serving.
//!
//! # Examples
//!
//! ```
//! use hamsieve::analysis::Normalizer;
//!
//! let normalizer = Normalizer::english();
//! assert_eq!(normalizer.normalize("I'll call you later"), "ill call you later");
//! assert_eq!(normalizer.normalize("!!!"), "");
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::analysis::stemmer::PorterStemmer;
use crate::analysis::stopwords::DEFAULT_ENGLISH_STOP_WORDS_SET;

/// The ASCII punctuation set removed before tokenization.
pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Maps raw message text to a normalized token string.
///
/// The pipeline is: lowercase, strip ASCII punctuation, split on whitespace
/// runs, drop stopwords, Porter-stem each remaining token, join with single
/// spaces. It is a pure function of the input and the stopword set: no
/// hidden state, no failures. Empty or non-alphabetic input yields an empty
/// string.
///
/// Predictions are only meaningful when serving normalizes exactly like
/// training did, so the normalizer is serialized into the model artifact
/// alongside the fitted vectorizer and classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    /// Ordered so that serialization is deterministic.
    stop_words: BTreeSet<String>,
    #[serde(skip, default)]
    stemmer: PorterStemmer,
}

impl Normalizer {
    /// Create a normalizer with the default English stopword set.
    pub fn english() -> Self {
        Normalizer {
            stop_words: DEFAULT_ENGLISH_STOP_WORDS_SET.clone(),
            stemmer: PorterStemmer::new(),
        }
    }

    /// Create a normalizer with a custom stopword set.
    pub fn with_stop_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Normalizer {
            stop_words: words.into_iter().map(|s| s.into()).collect(),
            stemmer: PorterStemmer::new(),
        }
    }

    /// Check if a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Normalize one message.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let cleaned: String = lowered.chars().filter(|c| !PUNCTUATION.contains(*c)).collect();

        let mut out = String::with_capacity(cleaned.len());
        for token in cleaned.split_whitespace() {
            if self.is_stop_word(token) {
                continue;
            }
            let stemmed = self.stemmer.stem(token);
            if stemmed.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&stemmed);
        }
        out
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::english()
    }
}
