//! Training data preparation
//!
//! # Components
//! - `corpus.rs`: CSV corpus of (original, corrected) sentence pairs
//! - `filter.rs`: Minimal-edit filter on character Levenshtein distance
//! - `dataset.rs`: Tag dataset builder (alignment, vocabulary, encoding, split)

pub mod corpus;
pub mod dataset;
pub mod filter;

pub use corpus::{read_pairs, TextPair};
pub use dataset::{DatasetConfig, DatasetSplits, EncodedRow, TagDatasetBuilder};
pub use filter::{levenshtein, minimal_edit};
