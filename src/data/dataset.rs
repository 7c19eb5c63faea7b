//! Tag dataset builder
//!
//! Handles:
//! - Aligning every sentence pair into per-token tags
//! - Building the tag vocabulary from the aligned corpus
//! - Encoding tokens with first-sub-token labels (`-100` elsewhere)
//! - Seeded train/validation split and JSONL output

use super::corpus::TextPair;
use super::filter::{minimal_edit, DEFAULT_THRESHOLD};
use crate::error::{Result, SpellfixError};
use crate::labels::assign_labels;
use crate::tags::{diff_to_tags, TagVocab, TaggedExample};
use crate::tokenizer::{EncodeOptions, SubwordTokenizer};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const TRAIN_FILE: &str = "train.jsonl";
pub const VALIDATION_FILE: &str = "validation.jsonl";
pub const TAG_VOCAB_FILE: &str = "tag2id.json";

/// Dataset preparation settings
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetConfig {
    /// Sequence length after truncation/padding
    pub max_length: usize,
    /// Shuffle seed for the split
    pub seed: u64,
    /// Validation fraction; no split unless `0 < val_split < 1`
    pub val_split: f64,
    /// Minimal-edit ceiling
    pub threshold: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            max_length: 128,
            seed: 42,
            val_split: 0.05,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl DatasetConfig {
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_val_split(mut self, val_split: f64) -> Self {
        self.val_split = val_split;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_length < 2 {
            return Err(SpellfixError::Config(format!(
                "max_length must be >= 2, got {}",
                self.max_length
            )));
        }
        if !(0.0..1.0).contains(&self.val_split) {
            return Err(SpellfixError::Config(format!(
                "val_split must be in [0, 1), got {}",
                self.val_split
            )));
        }
        if self.threshold < 0.0 {
            return Err(SpellfixError::Config(format!(
                "threshold must be >= 0, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// One encoded training row
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EncodedRow {
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub labels: Vec<i64>,
}

/// Encoded train rows plus the optional validation split
#[derive(Clone, Debug, Default)]
pub struct DatasetSplits {
    pub train: Vec<EncodedRow>,
    pub validation: Option<Vec<EncodedRow>>,
}

impl DatasetSplits {
    /// Write `train.jsonl`, `validation.jsonl` (if split) and `tag2id.json`
    pub fn save<P: AsRef<Path>>(&self, dir: P, vocab: &TagVocab) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        write_jsonl(dir.join(TRAIN_FILE), &self.train)?;
        if let Some(validation) = &self.validation {
            write_jsonl(dir.join(VALIDATION_FILE), validation)?;
        }
        vocab.save(dir.join(TAG_VOCAB_FILE))?;
        log::info!("dataset written to {}", dir.display());
        Ok(())
    }
}

/// One JSON object per line
pub fn write_jsonl<P: AsRef<Path>>(path: P, rows: &[EncodedRow]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Turns sentence pairs into a labelled token-classification dataset
pub struct TagDatasetBuilder<'t> {
    tokenizer: &'t dyn SubwordTokenizer,
    config: DatasetConfig,
    rng: StdRng,
    vocab: Option<TagVocab>,
}

impl<'t> TagDatasetBuilder<'t> {
    pub fn new(tokenizer: &'t dyn SubwordTokenizer, config: DatasetConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        TagDatasetBuilder {
            tokenizer,
            config,
            rng,
            vocab: None,
        }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Vocabulary built by the last `analyse` call
    pub fn vocab(&self) -> Option<&TagVocab> {
        self.vocab.as_ref()
    }

    /// Drop pairs that are not minimal edits
    pub fn filter_pairs(&self, pairs: Vec<TextPair>) -> Vec<TextPair> {
        let total = pairs.len();
        let kept: Vec<TextPair> = pairs
            .into_iter()
            .filter(|p| minimal_edit(&p.original, &p.corrected, self.config.threshold))
            .collect();
        log::info!("{} of {} pairs are minimal edits", kept.len(), total);
        kept
    }

    /// Align every pair on whitespace tokens and build the tag vocabulary
    pub fn analyse(&mut self, pairs: &[TextPair]) -> Vec<TaggedExample> {
        let examples: Vec<TaggedExample> = pairs
            .iter()
            .map(|pair| {
                let orig: Vec<&str> = pair.original.split_whitespace().collect();
                let corr: Vec<&str> = pair.corrected.split_whitespace().collect();
                diff_to_tags(&orig, &corr)
            })
            .collect();

        let vocab = TagVocab::build(&examples);
        log::info!("tag vocab size: {}", vocab.len());
        self.vocab = Some(vocab);
        examples
    }

    /// Tokenize each example and attach first-sub-token labels
    pub fn encode_examples(&self, examples: &[TaggedExample]) -> Result<Vec<EncodedRow>> {
        let vocab = self.vocab.as_ref().ok_or_else(|| {
            SpellfixError::Dataset("tag vocabulary not built; call analyse first".to_string())
        })?;
        let options = EncodeOptions::fixed(self.config.max_length);

        examples
            .iter()
            .map(|example| {
                let words: Vec<&str> = example.tokens().iter().map(String::as_str).collect();
                let encoding = self.tokenizer.encode_words(&words, &options)?;
                let labels = assign_labels(&encoding.word_ids, example.tags(), vocab);
                Ok(EncodedRow {
                    input_ids: encoding.input_ids,
                    attention_mask: encoding.attention_mask,
                    labels,
                })
            })
            .collect()
    }

    /// Analyse, shuffle, split and encode in one pass
    pub fn build_dataset(&mut self, pairs: &[TextPair]) -> Result<DatasetSplits> {
        let mut examples = self.analyse(pairs);
        let split = self.config.val_split;

        if split > 0.0 && split < 1.0 {
            examples.shuffle(&mut self.rng);
            let n_val = (examples.len() as f64 * split) as usize;
            let (validation, train) = examples.split_at(n_val);
            log::info!("train: {} | validation: {}", train.len(), validation.len());
            Ok(DatasetSplits {
                train: self.encode_examples(train)?,
                validation: Some(self.encode_examples(validation)?),
            })
        } else {
            Ok(DatasetSplits {
                train: self.encode_examples(&examples)?,
                validation: None,
            })
        }
    }
}
