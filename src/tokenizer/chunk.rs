//! Fixed-width chunk tokenizer
//!
//! Splits every word into `width`-character pieces and hashes each piece
//! into the id space. Sequences are wrapped in `<s>` ... `</s>`. Useful for
//! smoke runs without a trained `tokenizer.json`.

use super::{EncodeOptions, SubwordTokenizer, WordEncoding};
use crate::error::{Result, SpellfixError};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

pub const BOS_ID: u32 = 0;
pub const PAD_ID: u32 = 1;
pub const EOS_ID: u32 = 2;
pub const UNK_ID: u32 = 3;
const FIRST_PIECE_ID: u32 = 4;

#[derive(Clone, Debug)]
pub struct ChunkTokenizer {
    width: usize,
    vocab_size: usize,
}

impl ChunkTokenizer {
    pub fn new(width: usize, vocab_size: usize) -> Result<Self> {
        if width == 0 {
            return Err(SpellfixError::Config("chunk width must be > 0".to_string()));
        }
        if vocab_size <= FIRST_PIECE_ID as usize {
            return Err(SpellfixError::Config(format!(
                "vocab size must be > {}",
                FIRST_PIECE_ID
            )));
        }
        Ok(ChunkTokenizer { width, vocab_size })
    }

    fn piece_id(&self, piece: &str) -> u32 {
        let mut hasher = FxHasher::default();
        piece.hash(&mut hasher);
        let span = self.vocab_size as u64 - FIRST_PIECE_ID as u64;
        FIRST_PIECE_ID + (hasher.finish() % span) as u32
    }

    /// Pieces of one word, in order
    pub fn pieces(&self, word: &str) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        chars
            .chunks(self.width)
            .map(|chunk| chunk.iter().collect())
            .collect()
    }
}

impl SubwordTokenizer for ChunkTokenizer {
    fn encode_words(&self, words: &[&str], options: &EncodeOptions) -> Result<WordEncoding> {
        let mut encoding = WordEncoding::default();
        let mut push = |id: u32, word: Option<usize>| {
            encoding.input_ids.push(id);
            encoding.attention_mask.push(1);
            encoding.word_ids.push(word);
        };

        push(BOS_ID, None);
        for (idx, word) in words.iter().enumerate() {
            let pieces = self.pieces(word);
            if pieces.is_empty() {
                push(UNK_ID, Some(idx));
            }
            for piece in pieces {
                push(self.piece_id(&piece), Some(idx));
            }
        }
        push(EOS_ID, None);

        encoding.fit(options, PAD_ID);
        Ok(encoding)
    }

    fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}
