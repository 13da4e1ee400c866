//! Hyperparameter selection: k-fold cross-validation and exhaustive grid
//! search.
//!
//! Fold evaluations are embarrassingly parallel: each fold fits an
//! independent pipeline from scratch, so they run on the rayon pool with no
//! shared mutable state.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::Normalizer;
use crate::classifier::Penalty;
use crate::corpus::Label;
use crate::error::{HamsieveError, Result};
use crate::features::NgramRange;
use crate::pipeline::{PipelineParams, SpamClassifier};

/// K-Fold cross-validator.
///
/// Splits `n_samples` indices into k folds. With a seed set, indices are
/// shuffled reproducibly before folding; otherwise folds are contiguous.
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    seed: Option<u64>,
}

impl KFold {
    /// Create a new cross-validator. `n_splits` must be at least 2.
    pub fn new(n_splits: usize) -> Self {
        KFold {
            n_splits,
            seed: None,
        }
    }

    /// Shuffle indices with a fixed seed before folding.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate (train_indices, test_indices) for each fold.
    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 {
            return Err(HamsieveError::training(format!(
                "k-fold needs at least 2 splits, got {}",
                self.n_splits
            )));
        }
        if n_samples < self.n_splits {
            return Err(HamsieveError::training(format!(
                "cannot split {} samples into {} folds",
                n_samples, self.n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if let Some(seed) = self.seed {
            let mut rng = StdRng::seed_from_u64(seed);
            indices.shuffle(&mut rng);
        }

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut result = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for i in 0..self.n_splits {
            // The remainder is spread over the first folds.
            let current = if i < remainder { fold_size + 1 } else { fold_size };
            let end = start + current;

            let test: Vec<usize> = indices[start..end].to_vec();
            let mut train = Vec::with_capacity(n_samples - current);
            train.extend_from_slice(&indices[..start]);
            train.extend_from_slice(&indices[end..]);

            result.push((train, test));
            start = end;
        }

        Ok(result)
    }
}

/// The hyperparameter grid explored exhaustively by [`GridSearch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub ngram_ranges: Vec<NgramRange>,
    pub min_dfs: Vec<usize>,
    pub cs: Vec<f64>,
    pub penalties: Vec<Penalty>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        ParamGrid {
            ngram_ranges: vec![NgramRange::unigrams(), NgramRange::unigrams_and_bigrams()],
            min_dfs: vec![1, 2],
            cs: vec![0.1, 1.0, 10.0],
            penalties: vec![Penalty::L1, Penalty::L2],
        }
    }
}

impl ParamGrid {
    /// Enumerate the Cartesian product of all grid axes, in declaration
    /// order (n-gram range, then min_df, then C, then penalty).
    pub fn combinations(&self) -> Vec<PipelineParams> {
        let mut combos = Vec::with_capacity(
            self.ngram_ranges.len() * self.min_dfs.len() * self.cs.len() * self.penalties.len(),
        );
        for &ngram_range in &self.ngram_ranges {
            for &min_df in &self.min_dfs {
                for &c in &self.cs {
                    for &penalty in &self.penalties {
                        combos.push(PipelineParams {
                            ngram_range,
                            min_df,
                            c,
                            penalty,
                        });
                    }
                }
            }
        }
        combos
    }
}

/// Cross-validation outcome for one grid combination.
#[derive(Debug, Clone, Serialize)]
pub struct CombinationScore {
    pub params: PipelineParams,
    /// Accuracy per fold; empty when the combination failed to fit.
    pub fold_accuracies: Vec<f64>,
    /// Mean fold accuracy, or `-inf` for a failed combination.
    pub mean_accuracy: f64,
    /// The fit error that excluded this combination, if any.
    pub error: Option<String>,
}

/// The result of a grid search.
#[derive(Debug)]
pub struct GridSearchOutcome {
    /// The winning hyperparameters.
    pub best_params: PipelineParams,
    /// The winner's mean cross-validated accuracy.
    pub best_score: f64,
    /// Every combination's score, in enumeration order.
    pub scores: Vec<CombinationScore>,
    /// The winning pipeline, refit on the full training partition.
    pub classifier: SpamClassifier,
}

/// Exhaustive grid search scored by k-fold cross-validated accuracy.
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    normalizer: Normalizer,
    folds: usize,
    seed: u64,
}

impl GridSearch {
    /// Create a search over the given grid with 5 folds and a fixed seed.
    pub fn new(grid: ParamGrid) -> Self {
        GridSearch {
            grid,
            normalizer: Normalizer::english(),
            folds: 5,
            seed: 42,
        }
    }

    /// Set the number of cross-validation folds.
    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    /// Set the fold-shuffling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Use a custom normalizer.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Run the search over a labeled training partition.
    ///
    /// Every combination is cross-validated; a combination whose fit fails
    /// is recorded with a `-inf` score and excluded from the comparison
    /// without aborting the search. The best combination is the one with
    /// the highest mean fold accuracy; ties go to the first combination in
    /// enumeration order. The winner is refit on the whole partition.
    pub fn run(&self, messages: &[String], labels: &[Label]) -> Result<GridSearchOutcome> {
        if messages.len() != labels.len() {
            return Err(HamsieveError::training(format!(
                "{} messages but {} labels",
                messages.len(),
                labels.len()
            )));
        }
        let combos = self.grid.combinations();
        if combos.is_empty() {
            return Err(HamsieveError::training("hyperparameter grid is empty"));
        }

        // Normalize once; folds and combinations reuse the same corpus.
        let normalized: Vec<String> = messages
            .iter()
            .map(|m| self.normalizer.normalize(m))
            .collect();

        let splits = KFold::new(self.folds).with_seed(self.seed).split(normalized.len())?;

        let mut scores = Vec::with_capacity(combos.len());
        let mut best_idx = 0usize;
        let mut best_score = f64::NEG_INFINITY;

        for (combo_idx, params) in combos.iter().enumerate() {
            let fold_results: Vec<Result<f64>> = splits
                .par_iter()
                .map(|(train_idx, test_idx)| {
                    evaluate_fold(params, &self.normalizer, &normalized, labels, train_idx, test_idx)
                })
                .collect();

            let score = match collect_fold_accuracies(fold_results) {
                Ok(fold_accuracies) => {
                    let mean =
                        fold_accuracies.iter().sum::<f64>() / fold_accuracies.len() as f64;
                    CombinationScore {
                        params: *params,
                        fold_accuracies,
                        mean_accuracy: mean,
                        error: None,
                    }
                }
                Err(e) => CombinationScore {
                    params: *params,
                    fold_accuracies: Vec::new(),
                    mean_accuracy: f64::NEG_INFINITY,
                    error: Some(e.to_string()),
                },
            };

            // Strict comparison keeps the first-seen combination on ties.
            if score.mean_accuracy > best_score {
                best_idx = combo_idx;
                best_score = score.mean_accuracy;
            }
            scores.push(score);
        }

        if best_score == f64::NEG_INFINITY {
            return Err(HamsieveError::training(
                "every hyperparameter combination failed to fit",
            ));
        }

        let best_params = scores[best_idx].params;
        let classifier = SpamClassifier::fit_normalized(
            &best_params,
            self.normalizer.clone(),
            &normalized,
            labels,
        )?;

        Ok(GridSearchOutcome {
            best_params,
            best_score,
            scores,
            classifier,
        })
    }
}

/// Fit one fold's pipeline and score accuracy on the held-out fold.
pub(crate) fn evaluate_fold(
    params: &PipelineParams,
    normalizer: &Normalizer,
    normalized: &[String],
    labels: &[Label],
    train_idx: &[usize],
    test_idx: &[usize],
) -> Result<f64> {
    let train_texts: Vec<String> = train_idx.iter().map(|&i| normalized[i].clone()).collect();
    let train_labels: Vec<Label> = train_idx.iter().map(|&i| labels[i]).collect();

    let pipeline =
        SpamClassifier::fit_normalized(params, normalizer.clone(), &train_texts, &train_labels)?;

    let mut correct = 0usize;
    for &i in test_idx {
        if pipeline.predict_normalized(&normalized[i])? == labels[i] {
            correct += 1;
        }
    }
    Ok(correct as f64 / test_idx.len() as f64)
}

fn collect_fold_accuracies(fold_results: Vec<Result<f64>>) -> Result<Vec<f64>> {
    fold_results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kfold_split_sizes() {
        let splits = KFold::new(5).split(23).unwrap();
        assert_eq!(splits.len(), 5);

        let test_sizes: Vec<usize> = splits.iter().map(|(_, t)| t.len()).collect();
        assert_eq!(test_sizes, vec![5, 5, 5, 4, 4]);
        for (train, test) in &splits {
            assert_eq!(train.len() + test.len(), 23);
        }
    }

    #[test]
    fn test_kfold_covers_every_index_once() {
        let splits = KFold::new(4).split(10).unwrap();
        let mut seen: Vec<usize> = splits.iter().flat_map(|(_, t)| t.iter().copied()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_kfold_seed_reproducible() {
        let a = KFold::new(3).with_seed(9).split(12).unwrap();
        let b = KFold::new(3).with_seed(9).split(12).unwrap();
        assert_eq!(a, b);

        let c = KFold::new(3).with_seed(10).split(12).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_kfold_validation() {
        assert!(KFold::new(1).split(10).is_err());
        assert!(KFold::new(5).split(3).is_err());
    }

    #[test]
    fn test_grid_enumeration_order() {
        let grid = ParamGrid {
            ngram_ranges: vec![NgramRange::unigrams(), NgramRange::unigrams_and_bigrams()],
            min_dfs: vec![1, 2],
            cs: vec![0.1, 1.0, 10.0],
            penalties: vec![Penalty::L1, Penalty::L2],
        };
        let combos = grid.combinations();

        assert_eq!(combos.len(), 24);
        // First combination is the first value of every axis.
        assert_eq!(combos[0].ngram_range, NgramRange::unigrams());
        assert_eq!(combos[0].min_df, 1);
        assert_eq!(combos[0].c, 0.1);
        assert_eq!(combos[0].penalty, Penalty::L1);
        // The innermost axis (penalty) varies fastest.
        assert_eq!(combos[1].penalty, Penalty::L2);
        assert_eq!(combos[1].c, 0.1);
    }

    #[test]
    fn test_empty_grid_fails() {
        let grid = ParamGrid {
            ngram_ranges: vec![],
            min_dfs: vec![1],
            cs: vec![1.0],
            penalties: vec![Penalty::L2],
        };
        let search = GridSearch::new(grid);
        let messages: Vec<String> = (0..10).map(|i| format!("message {i}")).collect();
        let labels = vec![Label::Ham; 10];
        assert!(search.run(&messages, &labels).is_err());
    }
}
