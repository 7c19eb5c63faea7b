//! Correction tally: which fixes the tagger applies most often
//!
//! Tracks:
//! - Replacement pairs (original word -> replacement), counted
//! - Deleted words, counted
//! - How many sentences were checked and how many changed

use super::correction::CorrectionResponse;
use crate::tags::Tag;
use rustc_hash::FxHashMap;

/// Occurrences before a replacement counts as recurring
const REPEAT_THRESHOLD: u32 = 3;

#[derive(Clone, Debug, Default)]
pub struct CorrectionTally {
    /// (original, replacement) -> count
    replacements: FxHashMap<(String, String), u32>,
    /// deleted word -> count
    deletions: FxHashMap<String, u32>,
    sentences: u32,
    corrected_sentences: u32,
    total_corrections: u32,
}

impl CorrectionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every edit in one response
    pub fn record(&mut self, response: &CorrectionResponse) {
        if response.original_sentence.trim().is_empty() {
            return;
        }
        self.sentences += 1;
        if response.corrections_made {
            self.corrected_sentences += 1;
        }

        for detail in &response.token_details {
            match Tag::parse(&detail.pred_tag) {
                Tag::Replace(word) if word != detail.token => {
                    *self
                        .replacements
                        .entry((detail.token.clone(), word))
                        .or_insert(0) += 1;
                    self.total_corrections += 1;
                }
                Tag::Delete => {
                    *self.deletions.entry(detail.token.clone()).or_insert(0) += 1;
                    self.total_corrections += 1;
                }
                _ => {}
            }
        }
    }

    /// Most frequent replacements; ties ordered by pair
    pub fn top_replacements(&self, count: usize) -> Vec<((String, String), u32)> {
        let mut pairs: Vec<((String, String), u32)> = self
            .replacements
            .iter()
            .map(|(pair, &n)| (pair.clone(), n))
            .collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        pairs.truncate(count);
        pairs
    }

    pub fn top_deletions(&self, count: usize) -> Vec<(String, u32)> {
        let mut words: Vec<(String, u32)> = self
            .deletions
            .iter()
            .map(|(word, &n)| (word.clone(), n))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(count);
        words
    }

    pub fn sentences(&self) -> u32 {
        self.sentences
    }

    pub fn total_corrections(&self) -> u32 {
        self.total_corrections
    }

    pub fn summary(&self) -> TallySummary {
        let mut recurring: Vec<(String, String)> = self
            .replacements
            .iter()
            .filter(|(_, n)| **n >= REPEAT_THRESHOLD)
            .map(|(pair, _)| pair.clone())
            .collect();
        recurring.sort();

        TallySummary {
            sentences: self.sentences,
            corrected_sentences: self.corrected_sentences,
            total_corrections: self.total_corrections,
            recurring,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// End-of-run totals
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TallySummary {
    pub sentences: u32,
    pub corrected_sentences: u32,
    pub total_corrections: u32,
    /// Replacements seen at least three times
    pub recurring: Vec<(String, String)>,
}
