//! Sub-word tokenizer boundary
//!
//! The tagger never looks inside the tokenizer: it only needs ids for the
//! classifier and, per position, the index of the word the piece came from.
//!
//! - `hf.rs`: `tokenizers`-backed implementation (`tokenizer.json`)
//! - `chunk.rs`: dependency-free fixed-width chunk tokenizer

pub mod chunk;
pub mod hf;

pub use chunk::ChunkTokenizer;
pub use hf::HfTokenizer;

use crate::error::Result;

/// Truncation / padding applied while encoding
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Cut the sequence (special tokens included) to this many positions
    pub max_length: Option<usize>,
    /// Pad up to `max_length`
    pub pad_to_max_length: bool,
}

impl EncodeOptions {
    /// Truncate and pad to exactly `max_length` positions
    pub fn fixed(max_length: usize) -> Self {
        EncodeOptions {
            max_length: Some(max_length),
            pad_to_max_length: true,
        }
    }
}

/// Encoded pre-split words
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordEncoding {
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    /// Source word per position; `None` for special and padding positions
    pub word_ids: Vec<Option<usize>>,
}

impl WordEncoding {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Number of distinct words that kept at least one sub-token
    pub fn word_count(&self) -> usize {
        self.word_ids
            .iter()
            .flatten()
            .max()
            .map(|&w| w + 1)
            .unwrap_or(0)
    }

    /// Apply `options` in place. Truncation keeps the trailing special
    /// tokens (e.g. `</s>`) and drops word pieces before them.
    pub fn fit(&mut self, options: &EncodeOptions, pad_id: u32) {
        let Some(max_length) = options.max_length else {
            return;
        };

        if self.len() > max_length {
            let trailing = self
                .word_ids
                .iter()
                .rev()
                .take_while(|w| w.is_none())
                .count();
            if trailing < max_length {
                let head = max_length - trailing;
                let tail = self.len() - trailing;
                self.input_ids.drain(head..tail);
                self.attention_mask.drain(head..tail);
                self.word_ids.drain(head..tail);
            } else {
                self.input_ids.truncate(max_length);
                self.attention_mask.truncate(max_length);
                self.word_ids.truncate(max_length);
            }
        }

        if options.pad_to_max_length && self.len() < max_length {
            self.input_ids.resize(max_length, pad_id);
            self.attention_mask.resize(max_length, 0);
            self.word_ids.resize(max_length, None);
        }
    }
}

/// Tokenizer over words that were already split on whitespace
pub trait SubwordTokenizer: Send + Sync {
    fn encode_words(&self, words: &[&str], options: &EncodeOptions) -> Result<WordEncoding>;

    fn vocab_size(&self) -> usize;
}

impl<T: SubwordTokenizer + ?Sized> SubwordTokenizer for Box<T> {
    fn encode_words(&self, words: &[&str], options: &EncodeOptions) -> Result<WordEncoding> {
        (**self).encode_words(words, options)
    }

    fn vocab_size(&self) -> usize {
        (**self).vocab_size()
    }
}
