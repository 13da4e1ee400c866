//! # Hamsieve
//!
//! A binary SMS spam classifier (ham vs. spam) for Rust.
//!
//! ## Features
//!
//! - Deterministic text normalization pipeline (lowercase, punctuation
//!   stripping, stopword removal, Porter stemming)
//! - TF-IDF n-gram feature extraction with document-frequency pruning
//! - L1/L2-regularized logistic regression
//! - Exhaustive grid search with k-fold cross-validation
//! - Versioned, checksummed model artifacts
//! - A load-once serving handle for request/response prediction
//!
//! The training path and every serving path share one [`analysis::Normalizer`],
//! so a message is normalized byte-for-byte identically wherever it enters
//! the system.

pub mod analysis;
pub mod artifact;
pub mod classifier;
pub mod cli;
pub mod corpus;
pub mod error;
pub mod evaluate;
pub mod features;
pub mod model_selection;
pub mod pipeline;
pub mod serve;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
