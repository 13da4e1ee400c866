//! TF-IDF n-gram feature extraction.
//!
//! [`TfIdfVectorizer`] is fitted once on a normalized training corpus and is
//! immutable afterwards. `transform` never fails: terms outside the fitted
//! vocabulary contribute nothing, and the output dimensionality is always
//! the fitted vocabulary size.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{HamsieveError, Result};

/// An inclusive n-gram size range, e.g. `(1, 1)` for unigrams only or
/// `(1, 2)` for unigrams and bigrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NgramRange {
    pub min_n: usize,
    pub max_n: usize,
}

impl NgramRange {
    /// Create a new range. `min_n` must be at least 1 and no greater than
    /// `max_n`.
    pub fn new(min_n: usize, max_n: usize) -> Result<Self> {
        if min_n == 0 || min_n > max_n {
            return Err(HamsieveError::invalid_argument(format!(
                "ngram range ({min_n}, {max_n}) is invalid: need 1 <= min_n <= max_n"
            )));
        }
        Ok(NgramRange { min_n, max_n })
    }

    /// Unigrams only.
    pub fn unigrams() -> Self {
        NgramRange { min_n: 1, max_n: 1 }
    }

    /// Unigrams and bigrams.
    pub fn unigrams_and_bigrams() -> Self {
        NgramRange { min_n: 1, max_n: 2 }
    }
}

impl Default for NgramRange {
    fn default() -> Self {
        Self::unigrams()
    }
}

impl std::fmt::Display for NgramRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.min_n, self.max_n)
    }
}

/// A sparse feature vector with a fixed dimensionality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// The all-zero vector of the given dimensionality.
    pub fn zeros(dim: usize) -> Self {
        SparseVector {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from (index, value) pairs. Indices must be strictly increasing
    /// and within `dim`; this is an internal constructor used by the
    /// vectorizer, which guarantees both.
    pub(crate) fn from_pairs(dim: usize, pairs: Vec<(usize, f64)>) -> Self {
        let mut indices = Vec::with_capacity(pairs.len());
        let mut values = Vec::with_capacity(pairs.len());
        for (i, v) in pairs {
            debug_assert!(i < dim);
            indices.push(i);
            values.push(v);
        }
        SparseVector { dim, indices, values }
    }

    /// The vector's dimensionality (the fitted vocabulary size).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Iterate over (index, value) pairs of non-zero entries.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Dot product against a dense weight vector of the same dimensionality.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(i, v)| v * dense[i]).sum()
    }
}

/// Hyperparameters of the feature extractor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TfIdfConfig {
    /// N-gram sizes to extract.
    pub ngram_range: NgramRange,
    /// Minimum document frequency: terms seen in fewer documents are pruned
    /// from the vocabulary.
    pub min_df: usize,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        TfIdfConfig {
            ngram_range: NgramRange::unigrams(),
            min_df: 1,
        }
    }
}

/// TF-IDF vectorizer over whitespace-separated normalized text.
///
/// Fitting builds the n-gram vocabulary and the inverse document frequency
/// table; both are immutable afterwards and are persisted with the
/// classifier, since predictions are meaningless against a mismatched
/// vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: TfIdfConfig,
    /// Term -> column index. Indices are assigned over the sorted term list
    /// so that fitting the same corpus always yields the same layout.
    vocabulary: HashMap<String, usize>,
    /// IDF per column, same layout as `vocabulary`.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: TfIdfConfig) -> Self {
        TfIdfVectorizer {
            config,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
        }
    }

    /// Fit the vocabulary and IDF table on a normalized corpus.
    pub fn fit(&mut self, corpus: &[String]) -> Result<()> {
        if corpus.is_empty() {
            return Err(HamsieveError::feature("cannot fit on an empty corpus"));
        }

        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for doc in corpus {
            let unique_terms: HashSet<String> = self.ngrams(doc).into_iter().collect();
            for term in unique_terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<(String, usize)> = document_frequency
            .into_iter()
            .filter(|(_, df)| *df >= self.config.min_df)
            .collect();
        if terms.is_empty() {
            return Err(HamsieveError::feature(format!(
                "min_df={} left no terms in the vocabulary",
                self.config.min_df
            )));
        }
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let n = corpus.len() as f64;
        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (idx, (term, df)) in terms.into_iter().enumerate() {
            vocabulary.insert(term, idx);
            // IDF = ln((N + 1) / (df + 1)) + 1
            idf.push(((n + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
        }

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = corpus.len();

        Ok(())
    }

    /// Transform one normalized document into a TF-IDF vector.
    ///
    /// Out-of-vocabulary terms are silently ignored; the result always has
    /// the fitted dimensionality.
    pub fn transform(&self, document: &str) -> SparseVector {
        let terms = self.ngrams(document);
        if terms.is_empty() {
            return SparseVector::zeros(self.vocabulary.len());
        }

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in &terms {
            if let Some(&idx) = self.vocabulary.get(term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let doc_length = terms.len() as f64;
        let mut pairs: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, count)| (idx, count / doc_length * self.idf[idx]))
            .collect();
        pairs.sort_by_key(|(idx, _)| *idx);

        SparseVector::from_pairs(self.vocabulary.len(), pairs)
    }

    /// Whether `fit` has been called.
    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Size of the fitted vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of documents the vectorizer was fitted on.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// The vectorizer's configuration.
    pub fn config(&self) -> &TfIdfConfig {
        &self.config
    }

    /// Extract the configured n-grams from a whitespace-tokenized document.
    fn ngrams(&self, document: &str) -> Vec<String> {
        let tokens: Vec<&str> = document.split_whitespace().collect();
        let mut terms = Vec::new();
        for n in self.config.ngram_range.min_n..=self.config.ngram_range.max_n {
            if n == 0 || n > tokens.len() {
                continue;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "win free prize now".to_string(),
            "call you later".to_string(),
            "free entry win cash".to_string(),
            "meet you tomorrow".to_string(),
        ]
    }

    #[test]
    fn test_fit_builds_vocabulary() {
        let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default());
        vectorizer.fit(&corpus()).unwrap();

        assert!(vectorizer.is_fitted());
        assert_eq!(vectorizer.n_documents(), 4);
        // 11 distinct unigrams across the corpus.
        assert_eq!(vectorizer.vocabulary_size(), 11);
    }

    #[test]
    fn test_fit_empty_corpus_fails() {
        let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default());
        assert!(vectorizer.fit(&[]).is_err());
    }

    #[test]
    fn test_min_df_prunes_rare_terms() {
        let config = TfIdfConfig {
            ngram_range: NgramRange::unigrams(),
            min_df: 2,
        };
        let mut vectorizer = TfIdfVectorizer::new(config);
        vectorizer.fit(&corpus()).unwrap();

        // Only "win", "free" and "you" appear in two documents.
        assert_eq!(vectorizer.vocabulary_size(), 3);
    }

    #[test]
    fn test_min_df_too_strict_fails() {
        let config = TfIdfConfig {
            ngram_range: NgramRange::unigrams(),
            min_df: 100,
        };
        let mut vectorizer = TfIdfVectorizer::new(config);
        let err = vectorizer.fit(&corpus()).unwrap_err();
        assert!(err.to_string().contains("min_df"));
    }

    #[test]
    fn test_bigrams_extracted() {
        let config = TfIdfConfig {
            ngram_range: NgramRange::unigrams_and_bigrams(),
            min_df: 1,
        };
        let mut vectorizer = TfIdfVectorizer::new(config);
        vectorizer
            .fit(&["win free prize".to_string()])
            .unwrap();

        // 3 unigrams + 2 bigrams.
        assert_eq!(vectorizer.vocabulary_size(), 5);
        let v = vectorizer.transform("win free");
        assert!(v.nnz() >= 3); // "win", "free", "win free"
    }

    #[test]
    fn test_transform_unseen_terms_is_robust() {
        let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default());
        vectorizer.fit(&corpus()).unwrap();

        let v = vectorizer.transform("completely unknown vocabulary here");
        assert_eq!(v.dim(), vectorizer.vocabulary_size());
        assert_eq!(v.nnz(), 0);

        let v = vectorizer.transform("win unknownterm");
        assert_eq!(v.dim(), vectorizer.vocabulary_size());
        assert_eq!(v.nnz(), 1);
    }

    #[test]
    fn test_transform_empty_document() {
        let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default());
        vectorizer.fit(&corpus()).unwrap();

        let v = vectorizer.transform("");
        assert_eq!(v.dim(), vectorizer.vocabulary_size());
        assert_eq!(v.nnz(), 0);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let mut a = TfIdfVectorizer::new(TfIdfConfig::default());
        let mut b = TfIdfVectorizer::new(TfIdfConfig::default());
        a.fit(&corpus()).unwrap();
        b.fit(&corpus()).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.transform("win free cash"), b.transform("win free cash"));
    }

    #[test]
    fn test_sparse_vector_dot() {
        let v = SparseVector::from_pairs(4, vec![(0, 1.0), (2, 2.0)]);
        let dense = [0.5, 10.0, 0.25, 10.0];
        assert!((v.dot(&dense) - 1.0).abs() < 1e-12);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.dim(), 4);
    }

    #[test]
    fn test_ngram_range_validation() {
        assert!(NgramRange::new(0, 1).is_err());
        assert!(NgramRange::new(2, 1).is_err());
        assert!(NgramRange::new(1, 2).is_ok());
    }
}
