//! Read-only evaluation of a fitted classifier: accuracy, confusion matrix,
//! per-class precision/recall/F1, and k-fold cross-validation.

use serde::Serialize;

use crate::analysis::Normalizer;
use crate::corpus::Label;
use crate::error::{HamsieveError, Result};
use crate::model_selection::{KFold, evaluate_fold};
use crate::pipeline::{PipelineParams, SpamClassifier};

/// Precision, recall and F1 for a single class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true instances of this class in the evaluation set.
    pub support: usize,
}

/// Per-class metrics for both classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub ham: ClassMetrics,
    pub spam: ClassMetrics,
}

/// The full evaluation of a classifier over a labeled set.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    /// Rows are true labels, columns are predictions, in `[ham, spam]`
    /// order: `confusion[t][p]` counts messages with true class `t`
    /// predicted as `p`.
    pub confusion: [[usize; 2]; 2],
    pub report: ClassificationReport,
}

/// Fraction of predictions that match the true labels.
pub fn accuracy(predictions: &[Label], truth: &[Label]) -> Result<f64> {
    if predictions.len() != truth.len() || predictions.is_empty() {
        return Err(HamsieveError::training(
            "accuracy requires equal-length, non-empty inputs",
        ));
    }
    let correct = predictions
        .iter()
        .zip(truth.iter())
        .filter(|(p, t)| p == t)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// 2x2 confusion matrix, rows = truth, columns = prediction.
pub fn confusion_matrix(predictions: &[Label], truth: &[Label]) -> Result<[[usize; 2]; 2]> {
    if predictions.len() != truth.len() || predictions.is_empty() {
        return Err(HamsieveError::training(
            "confusion matrix requires equal-length, non-empty inputs",
        ));
    }
    let mut matrix = [[0usize; 2]; 2];
    for (p, t) in predictions.iter().zip(truth.iter()) {
        matrix[t.to_index()][p.to_index()] += 1;
    }
    Ok(matrix)
}

fn class_metrics(confusion: &[[usize; 2]; 2], class: usize) -> ClassMetrics {
    let tp = confusion[class][class];
    let fp = confusion[1 - class][class];
    let fn_ = confusion[class][1 - class];
    let support = tp + fn_;

    // Undefined ratios (no predicted or no true instances) score zero.
    let precision = if tp + fp == 0 {
        0.0
    } else {
        tp as f64 / (tp + fp) as f64
    };
    let recall = if support == 0 {
        0.0
    } else {
        tp as f64 / support as f64
    };
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    ClassMetrics {
        precision,
        recall,
        f1,
        support,
    }
}

/// Evaluate a fitted classifier on a labeled set.
pub fn evaluate(
    classifier: &SpamClassifier,
    messages: &[String],
    labels: &[Label],
) -> Result<Evaluation> {
    if messages.len() != labels.len() || messages.is_empty() {
        return Err(HamsieveError::training(
            "evaluation requires equal-length, non-empty inputs",
        ));
    }

    let predictions = messages
        .iter()
        .map(|m| classifier.predict(m))
        .collect::<Result<Vec<Label>>>()?;

    let confusion = confusion_matrix(&predictions, labels)?;
    Ok(Evaluation {
        accuracy: accuracy(&predictions, labels)?,
        confusion,
        report: ClassificationReport {
            ham: class_metrics(&confusion, Label::Ham.to_index()),
            spam: class_metrics(&confusion, Label::Spam.to_index()),
        },
    })
}

/// K-fold cross-validation result.
#[derive(Debug, Clone, Serialize)]
pub struct CrossValidation {
    pub fold_accuracies: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

/// K-fold cross-validated accuracy for one hyperparameter combination.
///
/// Runs over the entire labeled set it is given. When that set is the full
/// dataset, the mean is an optimistic estimate for hyperparameters that were
/// themselves selected on part of the same data; callers that need an
/// unbiased figure should hold out a test partition first.
pub fn cross_validate(
    params: &PipelineParams,
    normalizer: &Normalizer,
    messages: &[String],
    labels: &[Label],
    folds: usize,
    seed: u64,
) -> Result<CrossValidation> {
    if messages.len() != labels.len() {
        return Err(HamsieveError::training(format!(
            "{} messages but {} labels",
            messages.len(),
            labels.len()
        )));
    }

    let normalized: Vec<String> = messages.iter().map(|m| normalizer.normalize(m)).collect();
    let splits = KFold::new(folds).with_seed(seed).split(normalized.len())?;

    let mut fold_accuracies = Vec::with_capacity(splits.len());
    for (train_idx, test_idx) in &splits {
        fold_accuracies.push(evaluate_fold(
            params,
            normalizer,
            &normalized,
            labels,
            train_idx,
            test_idx,
        )?);
    }

    let mean = fold_accuracies.iter().sum::<f64>() / fold_accuracies.len() as f64;
    let variance = fold_accuracies
        .iter()
        .map(|a| (a - mean).powi(2))
        .sum::<f64>()
        / fold_accuracies.len() as f64;

    Ok(CrossValidation {
        fold_accuracies,
        mean,
        std: variance.sqrt(),
    })
}
