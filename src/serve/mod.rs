//! The serving contract shared by external frontends.
//!
//! HTTP servers and interactive shells are collaborators, not part of this
//! crate; both consume the same [`ModelHandle`] and the request/response
//! types here, so classification behaves identically regardless of the
//! frontend.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::artifact::{self, ModelMetadata};
use crate::corpus::Label;
use crate::error::{HamsieveError, Result};
use crate::pipeline::SpamClassifier;

/// A prediction request. `message` is optional on the wire so that a
/// missing field surfaces as a client error instead of a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// A prediction response: `{"prediction": "ham"|"spam"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: Label,
}

/// A shared, immutable handle to a loaded model.
///
/// The model is loaded once and never mutated afterwards; `Clone` is an
/// `Arc` bump, so every request thread can hold its own handle.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    classifier: SpamClassifier,
    metadata: ModelMetadata,
}

impl ModelHandle {
    /// Load a model artifact from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (classifier, metadata) = artifact::load(path)?;
        Ok(ModelHandle {
            inner: Arc::new(Inner {
                classifier,
                metadata,
            }),
        })
    }

    /// Wrap an in-memory classifier, e.g. one just fitted by training.
    pub fn from_classifier(classifier: SpamClassifier, metadata: ModelMetadata) -> Self {
        ModelHandle {
            inner: Arc::new(Inner {
                classifier,
                metadata,
            }),
        }
    }

    /// Metadata recorded when the model was trained.
    pub fn metadata(&self) -> &ModelMetadata {
        &self.inner.metadata
    }

    /// Classify one message. An empty message is valid input and
    /// classifies deterministically.
    pub fn classify(&self, message: &str) -> Result<Label> {
        self.inner.classifier.predict(message)
    }

    /// Handle a prediction request.
    ///
    /// A request without a `message` field is a client error
    /// ([`HamsieveError::Request`]), never a crash.
    pub fn handle(&self, request: &PredictRequest) -> Result<PredictResponse> {
        let message = request
            .message
            .as_deref()
            .ok_or_else(|| HamsieveError::request("missing required field \"message\""))?;
        Ok(PredictResponse {
            prediction: self.classify(message)?,
        })
    }
}
