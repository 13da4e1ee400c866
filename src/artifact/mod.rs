//! Versioned on-disk persistence for fitted classifiers.
//!
//! Layout: 8-byte magic, u32 format version, u32 CRC32 of the payload, then
//! the bincode payload (fitted pipeline + metadata). Loading verifies each
//! layer in order and fails loudly; a model is never partially usable.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HamsieveError, Result};
use crate::pipeline::{PipelineParams, SpamClassifier};

/// File magic identifying a model artifact.
pub const MAGIC: [u8; 8] = *b"HAMSIEVE";

/// Current artifact format version. Bumped on any payload layout change.
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = MAGIC.len() + 4 + 4;

/// Provenance recorded alongside a persisted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// When the model was fitted.
    pub trained_at: DateTime<Utc>,
    /// The winning hyperparameters.
    pub params: PipelineParams,
    /// Number of messages the model was fitted on.
    pub training_messages: usize,
    /// Fitted vocabulary size.
    pub vocabulary_size: usize,
    /// Version of this crate at training time.
    pub crate_version: String,
}

impl ModelMetadata {
    /// Capture metadata for a freshly fitted classifier.
    pub fn for_classifier(classifier: &SpamClassifier) -> Self {
        ModelMetadata {
            trained_at: Utc::now(),
            params: *classifier.params(),
            training_messages: classifier.training_messages(),
            vocabulary_size: classifier.vocabulary_size(),
            crate_version: crate::VERSION.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ArtifactPayload {
    classifier: SpamClassifier,
    metadata: ModelMetadata,
}

/// Serialize a fitted classifier and its metadata to `path`.
pub fn save<P: AsRef<Path>>(
    path: P,
    classifier: &SpamClassifier,
    metadata: &ModelMetadata,
) -> Result<()> {
    let payload = ArtifactPayload {
        classifier: classifier.clone(),
        metadata: metadata.clone(),
    };
    let encoded = bincode::serde::encode_to_vec(&payload, bincode::config::standard())
        .map_err(|e| HamsieveError::artifact(format!("failed to encode model: {e}")))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + encoded.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&crc32fast::hash(&encoded).to_le_bytes());
    bytes.extend_from_slice(&encoded);

    fs::write(path.as_ref(), bytes)?;
    Ok(())
}

/// Load a classifier and its metadata from `path`.
///
/// Fails with an [`HamsieveError::Artifact`] error on bad magic, an
/// unsupported format version, a checksum mismatch, or an undecodable
/// payload.
pub fn load<P: AsRef<Path>>(path: P) -> Result<(SpamClassifier, ModelMetadata)> {
    let bytes = fs::read(path.as_ref())?;
    if bytes.len() < HEADER_LEN {
        return Err(HamsieveError::artifact(format!(
            "file too short to be a model artifact ({} bytes)",
            bytes.len()
        )));
    }

    if bytes[..MAGIC.len()] != MAGIC {
        return Err(HamsieveError::artifact(
            "bad magic: not a hamsieve model artifact",
        ));
    }

    let version = u32::from_le_bytes(
        bytes[MAGIC.len()..MAGIC.len() + 4]
            .try_into()
            .map_err(|_| HamsieveError::artifact("truncated version field"))?,
    );
    if version != FORMAT_VERSION {
        return Err(HamsieveError::artifact(format!(
            "unsupported artifact format version {version}, expected {FORMAT_VERSION}"
        )));
    }

    let stored_crc = u32::from_le_bytes(
        bytes[MAGIC.len() + 4..HEADER_LEN]
            .try_into()
            .map_err(|_| HamsieveError::artifact("truncated checksum field"))?,
    );
    let payload = &bytes[HEADER_LEN..];
    let actual_crc = crc32fast::hash(payload);
    if actual_crc != stored_crc {
        return Err(HamsieveError::artifact(format!(
            "checksum mismatch: stored {stored_crc:#010x}, computed {actual_crc:#010x}"
        )));
    }

    let (decoded, _): (ArtifactPayload, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .map_err(|e| HamsieveError::artifact(format!("failed to decode model: {e}")))?;

    Ok((decoded.classifier, decoded.metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::analysis::Normalizer;
    use crate::corpus::Label;
    use crate::error::HamsieveError;

    fn fitted() -> SpamClassifier {
        let rows = [
            ("call you later tonight", Label::Ham),
            ("meeting moved to three", Label::Ham),
            ("dinner at home soon", Label::Ham),
            ("win free prize now", Label::Spam),
            ("claim free cash now", Label::Spam),
            ("urgent prize winner claim", Label::Spam),
        ];
        let texts: Vec<String> = rows.iter().map(|(t, _)| t.to_string()).collect();
        let labels: Vec<Label> = rows.iter().map(|(_, l)| *l).collect();
        SpamClassifier::fit(
            &PipelineParams::default(),
            Normalizer::english(),
            &texts,
            &labels,
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_predictions() {
        let classifier = fitted();
        let metadata = ModelMetadata::for_classifier(&classifier);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.hamsieve");
        save(&path, &classifier, &metadata).unwrap();

        let (loaded, loaded_meta) = load(&path).unwrap();
        assert_eq!(loaded_meta, metadata);

        let probes = [
            "I'll call you later",
            "WIN a FREE prize now!!! Call 090xxx",
            "",
        ];
        for probe in probes {
            assert_eq!(
                loaded.predict(probe).unwrap(),
                classifier.predict(probe).unwrap()
            );
        }
    }

    #[test]
    fn test_bad_magic_rejected() {
        let classifier = fitted();
        let metadata = ModelMetadata::for_classifier(&classifier);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.hamsieve");
        save(&path, &classifier, &metadata).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes[0] = b'X';
        std::fs::write(&path, bytes).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, HamsieveError::Artifact(_)));
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let classifier = fitted();
        let metadata = ModelMetadata::for_classifier(&classifier);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.hamsieve");
        save(&path, &classifier, &metadata).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes[MAGIC.len()..MAGIC.len() + 4].copy_from_slice(&99u32.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("version 99"));
    }

    #[test]
    fn test_corrupt_payload_rejected() {
        let classifier = fitted();
        let metadata = ModelMetadata::for_classifier(&classifier);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.hamsieve");
        save(&path, &classifier, &metadata).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        std::fs::write(&path, bytes).unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn test_truncated_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.hamsieve");
        std::fs::write(&path, b"HAM").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load("/nonexistent/model.hamsieve").unwrap_err();
        assert!(matches!(err, HamsieveError::Io(_)));
    }
}
