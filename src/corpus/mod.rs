//! Labeled SMS dataset loading and partitioning.
//!
//! The input format is tab-separated, two columns, no header:
//! `label<TAB>message`, with labels restricted to `ham` or `spam`.
//! Loading is strict: a malformed row or an unknown label fails the whole
//! load with its line number, rather than being silently skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{HamsieveError, Result};

/// Binary message label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Ham,
    Spam,
}

impl Label {
    /// The wire string for this label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Ham => "ham",
            Label::Spam => "spam",
        }
    }

    /// Class index: ham = 0, spam = 1.
    pub fn to_index(self) -> usize {
        match self {
            Label::Ham => 0,
            Label::Spam => 1,
        }
    }

    /// Inverse of [`Label::to_index`]. Any non-zero index maps to spam.
    pub fn from_index(index: usize) -> Self {
        if index == 0 { Label::Ham } else { Label::Spam }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = HamsieveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ham" => Ok(Label::Ham),
            "spam" => Ok(Label::Spam),
            other => Err(HamsieveError::dataset(format!(
                "unknown label {other:?}: expected \"ham\" or \"spam\""
            ))),
        }
    }
}

/// One labeled message. The text is immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledMessage {
    pub text: String,
    pub label: Label,
}

impl LabeledMessage {
    pub fn new<S: Into<String>>(text: S, label: Label) -> Self {
        LabeledMessage {
            text: text.into(),
            label,
        }
    }
}

/// An ordered sequence of labeled messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    messages: Vec<LabeledMessage>,
}

impl Dataset {
    /// Create a dataset from rows.
    pub fn new(messages: Vec<LabeledMessage>) -> Self {
        Dataset { messages }
    }

    /// Load a `label<TAB>message` file.
    ///
    /// The first tab on a line separates the label from the message; later
    /// tabs belong to the message text. A line without a tab, or with a
    /// label outside {ham, spam}, fails the entire load.
    pub fn load_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);

        let mut messages = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let (label, text) = line.split_once('\t').ok_or_else(|| {
                HamsieveError::dataset(format!(
                    "line {}: expected label<TAB>message",
                    lineno + 1
                ))
            })?;
            let label = Label::from_str(label).map_err(|e| {
                HamsieveError::dataset(format!("line {}: {e}", lineno + 1))
            })?;
            messages.push(LabeledMessage::new(text, label));
        }

        Ok(Dataset { messages })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterate over rows in order.
    pub fn iter(&self) -> impl Iterator<Item = &LabeledMessage> {
        self.messages.iter()
    }

    /// The raw texts and labels as parallel vectors.
    pub fn texts_and_labels(&self) -> (Vec<String>, Vec<Label>) {
        let texts = self.messages.iter().map(|m| m.text.clone()).collect();
        let labels = self.messages.iter().map(|m| m.label).collect();
        (texts, labels)
    }

    /// Row counts per class: `[ham, spam]`.
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for m in &self.messages {
            counts[m.label.to_index()] += 1;
        }
        counts
    }
}

/// Split a dataset into train and test partitions, stratified by label.
///
/// Each class is shuffled independently with a seeded RNG and contributes
/// `round(class_len * test_ratio)` rows to the test partition, so both
/// partitions preserve the dataset's class proportions within sampling
/// tolerance. Row order within each partition follows the original dataset
/// order, and the same seed always produces the same split.
pub fn train_test_split(
    dataset: &Dataset,
    test_ratio: f64,
    seed: u64,
) -> Result<(Dataset, Dataset)> {
    if dataset.is_empty() {
        return Err(HamsieveError::dataset("cannot split an empty dataset"));
    }
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(HamsieveError::dataset(format!(
            "test_ratio must be in (0, 1), got {test_ratio}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);

    // Group row indices by class, preserving dataset order within a class.
    let mut class_indices: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (i, m) in dataset.messages.iter().enumerate() {
        class_indices[m.label.to_index()].push(i);
    }

    let mut test_indices = Vec::new();
    let mut train_indices = Vec::new();
    for indices in class_indices.iter_mut() {
        indices.shuffle(&mut rng);
        let n_test = (indices.len() as f64 * test_ratio).round() as usize;
        test_indices.extend_from_slice(&indices[..n_test]);
        train_indices.extend_from_slice(&indices[n_test..]);
    }

    train_indices.sort_unstable();
    test_indices.sort_unstable();

    let take = |indices: &[usize]| {
        Dataset::new(
            indices
                .iter()
                .map(|&i| dataset.messages[i].clone())
                .collect(),
        )
    };

    Ok((take(&train_indices), take(&test_indices)))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn synthetic(n_ham: usize, n_spam: usize) -> Dataset {
        let mut rows = Vec::new();
        for i in 0..n_ham {
            rows.push(LabeledMessage::new(format!("ham message {i}"), Label::Ham));
        }
        for i in 0..n_spam {
            rows.push(LabeledMessage::new(format!("spam message {i}"), Label::Spam));
        }
        Dataset::new(rows)
    }

    #[test]
    fn test_label_parse_and_display() {
        assert_eq!("ham".parse::<Label>().unwrap(), Label::Ham);
        assert_eq!("spam".parse::<Label>().unwrap(), Label::Spam);
        assert!("eggs".parse::<Label>().is_err());
        assert_eq!(Label::Spam.to_string(), "spam");
    }

    #[test]
    fn test_label_serde_wire_strings() {
        assert_eq!(serde_json::to_string(&Label::Ham).unwrap(), "\"ham\"");
        let label: Label = serde_json::from_str("\"spam\"").unwrap();
        assert_eq!(label, Label::Spam);
    }

    #[test]
    fn test_load_tsv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ham\tI'll call you later").unwrap();
        writeln!(file, "spam\tWIN a FREE prize now!!!").unwrap();
        file.flush().unwrap();

        let dataset = Dataset::load_tsv(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.class_counts(), [1, 1]);
        assert_eq!(
            dataset.iter().next().unwrap().text,
            "I'll call you later"
        );
    }

    #[test]
    fn test_load_tsv_rejects_missing_tab() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ham\tfine row").unwrap();
        writeln!(file, "no tab here").unwrap();
        file.flush().unwrap();

        let err = Dataset::load_tsv(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_tsv_rejects_unknown_label() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "eggs\tnot a valid label").unwrap();
        file.flush().unwrap();

        let err = Dataset::load_tsv(file.path()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 1"));
        assert!(msg.contains("eggs"));
    }

    #[test]
    fn test_load_tsv_keeps_tabs_in_message() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ham\tpart one\tpart two").unwrap();
        file.flush().unwrap();

        let dataset = Dataset::load_tsv(file.path()).unwrap();
        assert_eq!(dataset.iter().next().unwrap().text, "part one\tpart two");
    }

    #[test]
    fn test_split_is_stratified() {
        let dataset = synthetic(80, 20);
        let (train, test) = train_test_split(&dataset, 0.2, 42).unwrap();

        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);
        // 80/20 class balance carries into both partitions.
        assert_eq!(train.class_counts(), [64, 16]);
        assert_eq!(test.class_counts(), [16, 4]);
    }

    #[test]
    fn test_split_is_reproducible() {
        let dataset = synthetic(50, 50);
        let (train_a, test_a) = train_test_split(&dataset, 0.2, 7).unwrap();
        let (train_b, test_b) = train_test_split(&dataset, 0.2, 7).unwrap();

        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn test_split_seeds_differ() {
        let dataset = synthetic(50, 50);
        let (_, test_a) = train_test_split(&dataset, 0.2, 1).unwrap();
        let (_, test_b) = train_test_split(&dataset, 0.2, 2).unwrap();

        assert_ne!(test_a, test_b);
    }

    #[test]
    fn test_split_validation() {
        let dataset = synthetic(10, 10);
        assert!(train_test_split(&dataset, 0.0, 42).is_err());
        assert!(train_test_split(&dataset, 1.0, 42).is_err());
        assert!(train_test_split(&Dataset::default(), 0.2, 42).is_err());
    }
}
