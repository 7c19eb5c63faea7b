//! Sentence correction over a loaded tagger
//!
//! Handles:
//! - Explicit initialisation (tokenizer + tag vocabulary + weights, warm-up)
//! - Per-word tag prediction from first sub-tokens
//! - Top-k tag distributions per word
//! - Reconstruction and the response record

use crate::config::ServiceConfig;
use crate::error::{Result, SpellfixError};
use crate::labels::select_predictions;
use crate::model::{argmax, top_k, CandleTagger, TagClassifier};
use crate::tags::{apply_tags, Tag, TagVocab};
use crate::tokenizer::{EncodeOptions, HfTokenizer, SubwordTokenizer};
use serde::{Serialize, Serializer};
use std::time::Instant;

pub const EMPTY_MESSAGE: &str = "Input sentence was empty.";
pub const SUCCESS_MESSAGE: &str = "Typos checked successfully.";

/// Prediction for one original word
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TokenDetail {
    pub token: String,
    pub pred_tag: String,
    /// `(tag, probability)`, most probable first
    #[serde(serialize_with = "serialize_ordered")]
    pub top_probs: Vec<(String, f32)>,
}

/// Tag -> probability object, keeping rank order
fn serialize_ordered<S: Serializer>(
    probs: &[(String, f32)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(probs.iter().map(|(tag, p)| (tag, p)))
}

/// Result of correcting one sentence
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorrectionResponse {
    pub original_sentence: String,
    pub corrected_sentence: String,
    pub token_details: Vec<TokenDetail>,
    pub model_name: String,
    pub processing_time_ms: f64,
    pub corrections_made: bool,
    pub message: String,
}

impl CorrectionResponse {
    /// Response for blank input; no model call
    pub fn empty(sentence: &str, model_name: &str) -> Self {
        CorrectionResponse {
            original_sentence: sentence.to_string(),
            corrected_sentence: String::new(),
            token_details: Vec::new(),
            model_name: model_name.to_string(),
            processing_time_ms: 0.0,
            corrections_made: false,
            message: EMPTY_MESSAGE.to_string(),
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

/// Tokenizer, classifier and tag vocabulary bundled for inference
pub struct CorrectionService {
    tokenizer: Box<dyn SubwordTokenizer>,
    classifier: Box<dyn TagClassifier>,
    vocab: TagVocab,
    model_name: String,
}

impl CorrectionService {
    /// The classifier's output size must match the vocabulary
    pub fn new<T, C>(tokenizer: T, classifier: C, vocab: TagVocab, model_name: impl Into<String>) -> Result<Self>
    where
        T: SubwordTokenizer + 'static,
        C: TagClassifier + 'static,
    {
        if classifier.num_tags() != vocab.len() {
            return Err(SpellfixError::InvalidVocab(format!(
                "classifier predicts {} tags but tag2id.json has {}",
                classifier.num_tags(),
                vocab.len()
            )));
        }
        Ok(CorrectionService {
            tokenizer: Box::new(tokenizer),
            classifier: Box::new(classifier),
            vocab,
            model_name: model_name.into(),
        })
    }

    /// Load every model file named by `config`
    pub fn load(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        log::info!("loading model from {}", config.model_dir.display());

        let tokenizer = HfTokenizer::from_file(&config.tokenizer_path)?;
        let vocab = TagVocab::load(&config.tag_vocab_path)?;
        let tagger = CandleTagger::load(&config.weights_path)?;
        if tagger.config().vocab_size < tokenizer.vocab_size() {
            log::warn!(
                "tokenizer has {} ids but tagger embeds only {}",
                tokenizer.vocab_size(),
                tagger.config().vocab_size
            );
        }

        let service = Self::new(tokenizer, tagger, vocab, config.model_name.clone())?;
        if config.warm_up {
            service.correct("warm up", 1)?;
            log::debug!("warm-up done");
        }
        log::info!(
            "model '{}' ready with {} tags",
            service.model_name,
            service.vocab.len()
        );
        Ok(service)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn vocab(&self) -> &TagVocab {
        &self.vocab
    }

    fn tag_name(&self, id: usize) -> Tag {
        self.vocab.tag(id as u32).cloned().unwrap_or(Tag::Keep)
    }

    /// One predicted tag and top-k distribution per word
    pub fn predict(&self, words: &[&str], k: usize) -> Result<(Vec<Tag>, Vec<TokenDetail>)> {
        let k = k.clamp(1, self.vocab.len().max(1));
        let encoding = self.tokenizer.encode_words(words, &EncodeOptions::default())?;
        let probs = self.classifier.classify(&encoding)?;
        if probs.len() != encoding.len() {
            return Err(SpellfixError::Config(format!(
                "classifier returned {} rows for {} sub-tokens",
                probs.len(),
                encoding.len()
            )));
        }

        if encoding.word_count() < words.len() {
            log::warn!(
                "input truncated to {} of {} words; the rest are kept",
                encoding.word_count(),
                words.len()
            );
        }

        let rows = select_predictions(&encoding.word_ids, &probs, words.len());
        let mut tags = Vec::with_capacity(words.len());
        let mut details = Vec::with_capacity(words.len());
        for (word, row) in words.iter().zip(rows) {
            let (tag, top_probs) = match row {
                Some(row) => {
                    let tag = argmax(row).map(|id| self.tag_name(id)).unwrap_or(Tag::Keep);
                    let top_probs = top_k(row, k)
                        .into_iter()
                        .map(|(id, p)| (self.tag_name(id).to_string(), p))
                        .collect();
                    (tag, top_probs)
                }
                None => {
                    log::debug!("no sub-token for '{}'; keeping it", word);
                    (Tag::Keep, Vec::new())
                }
            };
            details.push(TokenDetail {
                token: word.to_string(),
                pred_tag: tag.to_string(),
                top_probs,
            });
            tags.push(tag);
        }
        Ok((tags, details))
    }

    /// Correct one sentence; `top_k` is clamped to `[1, num_tags]`
    pub fn correct(&self, sentence: &str, top_k: usize) -> Result<CorrectionResponse> {
        if sentence.trim().is_empty() {
            return Ok(CorrectionResponse::empty(sentence, &self.model_name));
        }

        let start = Instant::now();
        let words: Vec<&str> = sentence.split_whitespace().collect();
        let (tags, token_details) = self.predict(&words, top_k)?;
        let corrected = apply_tags(&words, &tags);
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;

        let corrections_made = normalize_whitespace(&corrected) != normalize_whitespace(sentence);
        log::debug!(
            "'{}' -> '{}' ({} words, {:.2} ms)",
            sentence,
            corrected,
            words.len(),
            elapsed
        );

        Ok(CorrectionResponse {
            original_sentence: sentence.to_string(),
            corrected_sentence: corrected,
            token_details,
            model_name: self.model_name.clone(),
            processing_time_ms: round_ms(elapsed),
            corrections_made,
            message: SUCCESS_MESSAGE.to_string(),
        })
    }
}
