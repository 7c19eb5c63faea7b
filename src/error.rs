//! Crate-wide error type
//!
//! Every fallible library operation returns [`Result`]. Alignment invariant
//! violations are not represented here: they are assertion failures.

use thiserror::Error;

/// Errors raised by the library layers (vocabulary, data, tokenizer, model)
#[derive(Debug, Error)]
pub enum SpellfixError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Weight bundle error: {0}")]
    Bundle(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Invalid tag vocabulary: {0}")]
    InvalidVocab(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for SpellfixError {
    fn from(err: bincode::Error) -> Self {
        SpellfixError::Bundle(err.to_string())
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, SpellfixError>;
