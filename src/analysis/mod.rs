//! Text analysis for SMS messages.
//!
//! The analysis pipeline is deliberately fixed: lowercase, strip ASCII
//! punctuation, split on whitespace runs, drop stopwords, Porter-stem the
//! survivors, and join with single spaces. Training and serving both go
//! through [`Normalizer::normalize`], which keeps the two paths
//! byte-for-byte identical.

pub mod normalizer;
pub mod stemmer;
pub mod stopwords;

pub use normalizer::Normalizer;
pub use stemmer::PorterStemmer;
pub use stopwords::DEFAULT_ENGLISH_STOP_WORDS;
