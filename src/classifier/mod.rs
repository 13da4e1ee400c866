//! Binary logistic regression over sparse TF-IDF features.
//!
//! The solver is deterministic full-batch proximal gradient descent:
//! weights start at zero, the descent step follows the averaged log-loss
//! gradient, and the penalty is applied either as an L2 gradient term or as
//! an L1 soft-thresholding step. One solver covers both penalties, which is
//! what lets the hyperparameter grid sweep `penalty` freely.

use serde::{Deserialize, Serialize};

use crate::corpus::Label;
use crate::error::{HamsieveError, Result};
use crate::features::SparseVector;

/// Weight penalty for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Penalty {
    /// Sparsity-inducing L1 penalty.
    L1,
    /// Standard L2 penalty.
    L2,
}

impl std::fmt::Display for Penalty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Penalty::L1 => f.write_str("l1"),
            Penalty::L2 => f.write_str("l2"),
        }
    }
}

impl std::str::FromStr for Penalty {
    type Err = HamsieveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "l1" => Ok(Penalty::L1),
            "l2" => Ok(Penalty::L2),
            other => Err(HamsieveError::invalid_argument(format!(
                "penalty must be \"l1\" or \"l2\", got {other:?}"
            ))),
        }
    }
}

/// L1/L2-regularized logistic regression.
///
/// `c` is the inverse regularization strength: larger values regularize
/// less. Training is deterministic for fixed data and hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    intercept: f64,
    c: f64,
    penalty: Penalty,
    learning_rate: f64,
    max_iter: usize,
    tolerance: f64,
}

impl LogisticRegression {
    /// Create an untrained classifier.
    pub fn new(c: f64, penalty: Penalty) -> Self {
        LogisticRegression {
            weights: Vec::new(),
            intercept: 0.0,
            c,
            penalty,
            learning_rate: 0.5,
            max_iter: 500,
            tolerance: 1e-7,
        }
    }

    /// Set the descent step size.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance on the largest weight change.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    /// Soft-thresholding operator, the proximal step for the L1 penalty.
    fn soft_threshold(value: f64, threshold: f64) -> f64 {
        if value > threshold {
            value - threshold
        } else if value < -threshold {
            value + threshold
        } else {
            0.0
        }
    }

    /// Fit the classifier on feature vectors and labels.
    pub fn fit(&mut self, x: &[SparseVector], y: &[Label]) -> Result<()> {
        if x.is_empty() {
            return Err(HamsieveError::training("training set is empty"));
        }
        if x.len() != y.len() {
            return Err(HamsieveError::training(format!(
                "{} feature vectors but {} labels",
                x.len(),
                y.len()
            )));
        }
        let dim = x[0].dim();
        if x.iter().any(|v| v.dim() != dim) {
            return Err(HamsieveError::training(
                "feature vectors have inconsistent dimensionality",
            ));
        }
        if !(self.c > 0.0) {
            return Err(HamsieveError::training(format!(
                "C must be positive, got {}",
                self.c
            )));
        }

        let n = x.len() as f64;
        let lambda = 1.0 / (self.c * n);

        let mut weights = vec![0.0f64; dim];
        let mut intercept = 0.0f64;

        for _ in 0..self.max_iter {
            let mut grad_w = vec![0.0f64; dim];
            let mut grad_b = 0.0f64;

            for (xi, yi) in x.iter().zip(y.iter()) {
                let p = Self::sigmoid(xi.dot(&weights) + intercept);
                let residual = p - yi.to_index() as f64;
                grad_b += residual;
                for (j, v) in xi.iter() {
                    grad_w[j] += residual * v;
                }
            }

            let mut max_change = 0.0f64;
            for j in 0..dim {
                let mut gradient = grad_w[j] / n;
                if self.penalty == Penalty::L2 {
                    gradient += lambda * weights[j];
                }
                let mut updated = weights[j] - self.learning_rate * gradient;
                if self.penalty == Penalty::L1 {
                    updated = Self::soft_threshold(updated, self.learning_rate * lambda);
                }
                max_change = max_change.max((updated - weights[j]).abs());
                weights[j] = updated;
            }

            // The intercept is never penalized.
            let intercept_step = self.learning_rate * grad_b / n;
            max_change = max_change.max(intercept_step.abs());
            intercept -= intercept_step;

            if max_change < self.tolerance {
                break;
            }
        }

        self.weights = weights;
        self.intercept = intercept;

        Ok(())
    }

    /// Whether the classifier has been fitted.
    pub fn is_fitted(&self) -> bool {
        !self.weights.is_empty()
    }

    /// Signed distance from the decision boundary.
    pub fn decision_function(&self, x: &SparseVector) -> Result<f64> {
        if !self.is_fitted() {
            return Err(HamsieveError::training("classifier is not fitted"));
        }
        if x.dim() != self.weights.len() {
            return Err(HamsieveError::feature(format!(
                "feature vector has dimension {}, classifier expects {}",
                x.dim(),
                self.weights.len()
            )));
        }
        Ok(x.dot(&self.weights) + self.intercept)
    }

    /// Spam probability for one feature vector.
    pub fn predict_proba(&self, x: &SparseVector) -> Result<f64> {
        Ok(Self::sigmoid(self.decision_function(x)?))
    }

    /// Predict the label for one feature vector.
    ///
    /// An all-zero vector is valid input: the sign of the intercept decides.
    pub fn predict(&self, x: &SparseVector) -> Result<Label> {
        let z = self.decision_function(x)?;
        Ok(if z >= 0.0 { Label::Spam } else { Label::Ham })
    }

    /// Accuracy over a labeled set.
    pub fn score(&self, x: &[SparseVector], y: &[Label]) -> Result<f64> {
        if x.len() != y.len() || x.is_empty() {
            return Err(HamsieveError::training(
                "scoring requires equal-length, non-empty inputs",
            ));
        }
        let mut correct = 0usize;
        for (xi, yi) in x.iter().zip(y.iter()) {
            if self.predict(xi)? == *yi {
                correct += 1;
            }
        }
        Ok(correct as f64 / x.len() as f64)
    }

    /// Inverse regularization strength.
    pub fn c(&self) -> f64 {
        self.c
    }

    /// Configured penalty.
    pub fn penalty(&self) -> Penalty {
        self.penalty
    }

    /// Fitted weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Fitted intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}
