//! Edit-tag spelling correction
//!
//! A sentence is corrected by predicting one edit tag per word (`KEEP`,
//! `DELETE`, `REPLACE_<word>`) and applying the tags to the original words.
//!
//! # Components
//! - `tags`: Diff-to-tag alignment, tag vocabulary, reconstruction
//! - `labels`: Word-to-sub-token label aggregation
//! - `tokenizer`: Sub-word tokenizer boundary (`tokenizers` backend)
//! - `model`: Token classifier boundary (Candle backend)
//! - `data`: Training data preparation
//! - `service`: Correction service, request boundary, batch tally
//! - `cli`: Terminal rendering

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod labels;
pub mod model;
pub mod service;
pub mod tags;
pub mod tokenizer;

pub use config::ServiceConfig;
pub use error::{Result, SpellfixError};
pub use service::{CorrectionResponse, CorrectionService, TypoEndpoint};
pub use tags::{apply_tags, diff_to_tags, Tag, TagVocab, TaggedExample};
