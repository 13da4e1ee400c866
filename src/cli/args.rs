//! Command line argument parsing for the Hamsieve CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::classifier::Penalty;

/// Hamsieve - an SMS spam classifier
#[derive(Parser, Debug, Clone)]
#[command(name = "hamsieve")]
#[command(about = "Train, evaluate and serve an SMS spam classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct HamsieveArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl HamsieveArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model with grid search and save the artifact
    Train(TrainArgs),

    /// Evaluate a saved model on a labeled dataset
    Evaluate(EvaluateArgs),

    /// Cross-validate one hyperparameter combination
    #[command(name = "cross-validate")]
    CrossValidate(CrossValidateArgs),

    /// Classify a single message with a saved model
    Predict(PredictArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Labeled dataset file (label<TAB>message per line)
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Where to write the model artifact
    #[arg(short = 'o', long = "output", value_name = "MODEL")]
    pub model_path: PathBuf,

    /// Fraction of each class held out for evaluation
    #[arg(long, default_value = "0.2")]
    pub test_ratio: f64,

    /// Seed for the stratified split and fold shuffling
    #[arg(short, long, default_value = "42")]
    pub seed: u64,

    /// Number of cross-validation folds for grid search
    #[arg(short = 'k', long, default_value = "5")]
    pub folds: usize,
}

/// Arguments for evaluating a saved model
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Labeled dataset file (label<TAB>message per line)
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Path to the model artifact
    #[arg(short = 'm', long = "model", value_name = "MODEL")]
    pub model_path: PathBuf,
}

/// Arguments for cross-validating one hyperparameter combination
#[derive(Parser, Debug, Clone)]
pub struct CrossValidateArgs {
    /// Labeled dataset file (label<TAB>message per line)
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Smallest n-gram size
    #[arg(long, default_value = "1")]
    pub min_n: usize,

    /// Largest n-gram size
    #[arg(long, default_value = "1")]
    pub max_n: usize,

    /// Minimum document frequency for vocabulary terms
    #[arg(long, default_value = "1")]
    pub min_df: usize,

    /// Inverse regularization strength
    #[arg(short = 'c', long = "regularization", default_value = "1.0")]
    pub c: f64,

    /// Weight penalty
    #[arg(short = 'p', long, default_value = "l2")]
    pub penalty: PenaltyArg,

    /// Number of folds
    #[arg(short = 'k', long, default_value = "5")]
    pub folds: usize,

    /// Seed for fold shuffling
    #[arg(short, long, default_value = "42")]
    pub seed: u64,
}

/// Arguments for one-shot prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Path to the model artifact
    #[arg(short = 'm', long = "model", value_name = "MODEL")]
    pub model_path: PathBuf,

    /// The message to classify
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Include the spam probability in the output
    #[arg(long)]
    pub probability: bool,
}

/// Penalty choices exposed on the command line
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyArg {
    /// Sparsity-inducing L1 penalty
    L1,
    /// Standard L2 penalty
    L2,
}

impl From<PenaltyArg> for Penalty {
    fn from(arg: PenaltyArg) -> Self {
        match arg {
            PenaltyArg::L1 => Penalty::L1,
            PenaltyArg::L2 => Penalty::L2,
        }
    }
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
