//! Error types for the Hamsieve library.
//!
//! All fallible operations in the crate return [`Result`], which wraps the
//! [`HamsieveError`] enum.
//!
//! # Examples
//!
//! ```
//! use hamsieve::error::{HamsieveError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(HamsieveError::dataset("unknown label"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Hamsieve operations.
#[derive(Error, Debug)]
pub enum HamsieveError {
    /// I/O errors (dataset files, model artifacts, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Dataset-related errors (malformed rows, unknown labels, bad splits)
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Feature extraction errors (unfitted vectorizer, empty vocabulary)
    #[error("Feature error: {0}")]
    Feature(String),

    /// Training and model-selection errors
    #[error("Training error: {0}")]
    Training(String),

    /// Model artifact errors (corrupt file, incompatible format version)
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Serving request errors (client-side problems, not crashes)
    #[error("Request error: {0}")]
    Request(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with HamsieveError.
pub type Result<T> = std::result::Result<T, HamsieveError>;

impl HamsieveError {
    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        HamsieveError::Dataset(msg.into())
    }

    /// Create a new feature extraction error.
    pub fn feature<S: Into<String>>(msg: S) -> Self {
        HamsieveError::Feature(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        HamsieveError::Training(msg.into())
    }

    /// Create a new artifact error.
    pub fn artifact<S: Into<String>>(msg: S) -> Self {
        HamsieveError::Artifact(msg.into())
    }

    /// Create a new request error.
    pub fn request<S: Into<String>>(msg: S) -> Self {
        HamsieveError::Request(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        HamsieveError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HamsieveError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = HamsieveError::dataset("Test dataset error");
        assert_eq!(error.to_string(), "Dataset error: Test dataset error");

        let error = HamsieveError::artifact("Test artifact error");
        assert_eq!(error.to_string(), "Artifact error: Test artifact error");

        let error = HamsieveError::request("Test request error");
        assert_eq!(error.to_string(), "Request error: Test request error");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let hamsieve_error = HamsieveError::from(io_error);

        match hamsieve_error {
            HamsieveError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_invalid_argument_format() {
        let error = HamsieveError::invalid_argument("penalty must be l1 or l2");
        assert_eq!(
            error.to_string(),
            "Error: Invalid argument: penalty must be l1 or l2"
        );
    }
}
