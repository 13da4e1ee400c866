//! The fitted classification pipeline: normalizer + vectorizer + classifier.

use serde::{Deserialize, Serialize};

use crate::analysis::Normalizer;
use crate::classifier::{LogisticRegression, Penalty};
use crate::corpus::Label;
use crate::error::{HamsieveError, Result};
use crate::features::{NgramRange, TfIdfConfig, TfIdfVectorizer};

/// One hyperparameter combination for the pipeline: the grid-search axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Vectorizer n-gram range.
    pub ngram_range: NgramRange,
    /// Vectorizer minimum document frequency.
    pub min_df: usize,
    /// Classifier inverse regularization strength.
    pub c: f64,
    /// Classifier penalty.
    pub penalty: Penalty,
}

impl Default for PipelineParams {
    fn default() -> Self {
        PipelineParams {
            ngram_range: NgramRange::unigrams(),
            min_df: 1,
            c: 1.0,
            penalty: Penalty::L2,
        }
    }
}

impl std::fmt::Display for PipelineParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ngram_range={} min_df={} C={} penalty={}",
            self.ngram_range, self.min_df, self.c, self.penalty
        )
    }
}

/// A fitted spam classifier.
///
/// Owns its normalizer, vectorizer and linear model; immutable after
/// fitting. `Send + Sync`, so a serving process can share one instance
/// read-only across concurrent requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpamClassifier {
    normalizer: Normalizer,
    vectorizer: TfIdfVectorizer,
    model: LogisticRegression,
    params: PipelineParams,
}

impl SpamClassifier {
    /// Fit a pipeline on raw messages.
    pub fn fit(
        params: &PipelineParams,
        normalizer: Normalizer,
        messages: &[String],
        labels: &[Label],
    ) -> Result<Self> {
        let normalized: Vec<String> = messages.iter().map(|m| normalizer.normalize(m)).collect();
        Self::fit_normalized(params, normalizer, &normalized, labels)
    }

    /// Fit a pipeline on an already-normalized corpus.
    ///
    /// The caller guarantees that `normalized` is the output of
    /// `normalizer.normalize` for each message; grid search uses this to
    /// normalize the corpus once instead of once per fold.
    pub fn fit_normalized(
        params: &PipelineParams,
        normalizer: Normalizer,
        normalized: &[String],
        labels: &[Label],
    ) -> Result<Self> {
        if normalized.len() != labels.len() {
            return Err(HamsieveError::training(format!(
                "{} messages but {} labels",
                normalized.len(),
                labels.len()
            )));
        }

        let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig {
            ngram_range: params.ngram_range,
            min_df: params.min_df,
        });
        vectorizer.fit(normalized)?;

        let x: Vec<_> = normalized.iter().map(|m| vectorizer.transform(m)).collect();
        let mut model = LogisticRegression::new(params.c, params.penalty);
        model.fit(&x, labels)?;

        Ok(SpamClassifier {
            normalizer,
            vectorizer,
            model,
            params: *params,
        })
    }

    /// Classify one raw message.
    pub fn predict(&self, text: &str) -> Result<Label> {
        let normalized = self.normalizer.normalize(text);
        self.predict_normalized(&normalized)
    }

    /// Classify one already-normalized message.
    pub fn predict_normalized(&self, normalized: &str) -> Result<Label> {
        let features = self.vectorizer.transform(normalized);
        self.model.predict(&features)
    }

    /// Spam probability for one raw message.
    pub fn predict_proba(&self, text: &str) -> Result<f64> {
        let normalized = self.normalizer.normalize(text);
        let features = self.vectorizer.transform(&normalized);
        self.model.predict_proba(&features)
    }

    /// The hyperparameters this pipeline was fitted with.
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// The normalizer shared by training and serving.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Fitted vocabulary size.
    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    /// Number of messages the pipeline was fitted on.
    pub fn training_messages(&self) -> usize {
        self.vectorizer.n_documents()
    }
}
