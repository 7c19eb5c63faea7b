//! Hugging Face `tokenizers` backend

use super::{EncodeOptions, SubwordTokenizer, WordEncoding};
use crate::error::{Result, SpellfixError};
use std::path::Path;
use tokenizers::Tokenizer;

/// Pad token names tried when `tokenizer.json` has no padding section
const PAD_CANDIDATES: [&str; 2] = ["<pad>", "[PAD]"];

/// Wrapper around a `tokenizer.json` model
pub struct HfTokenizer {
    inner: Tokenizer,
    pad_id: u32,
}

impl HfTokenizer {
    /// Load from a `tokenizer.json` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Tokenizer::from_file(path.as_ref()).map_err(|e| {
            SpellfixError::Tokenizer(format!(
                "failed to load {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(Self::new(inner))
    }

    pub fn new(inner: Tokenizer) -> Self {
        let pad_id = inner
            .get_padding()
            .map(|params| params.pad_id)
            .or_else(|| PAD_CANDIDATES.iter().find_map(|t| inner.token_to_id(t)))
            .unwrap_or(0);
        HfTokenizer { inner, pad_id }
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }
}

impl SubwordTokenizer for HfTokenizer {
    fn encode_words(&self, words: &[&str], options: &EncodeOptions) -> Result<WordEncoding> {
        let encoding = self
            .inner
            .encode(words.to_vec(), true)
            .map_err(|e| SpellfixError::Tokenizer(format!("failed to encode words: {}", e)))?;

        let mut encoded = WordEncoding {
            input_ids: encoding.get_ids().to_vec(),
            attention_mask: encoding.get_attention_mask().to_vec(),
            word_ids: encoding
                .get_word_ids()
                .iter()
                .map(|w| w.map(|w| w as usize))
                .collect(),
        };
        encoded.fit(options, self.pad_id);
        Ok(encoded)
    }

    fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer")
            .field("vocab_size", &self.vocab_size())
            .field("pad_id", &self.pad_id)
            .finish()
    }
}
