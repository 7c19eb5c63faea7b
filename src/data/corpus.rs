//! CSV corpus reader
//!
//! Expects a header row naming `original_text` and `corrected_text`; other
//! columns are ignored. Fields may be quoted, with `""` as an escaped quote
//! and newlines allowed inside quotes.

use crate::error::{Result, SpellfixError};
use std::fs;
use std::path::Path;

pub const ORIGINAL_COLUMN: &str = "original_text";
pub const CORRECTED_COLUMN: &str = "corrected_text";

/// One noisy sentence and its correction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextPair {
    pub original: String,
    pub corrected: String,
}

impl TextPair {
    pub fn new(original: impl Into<String>, corrected: impl Into<String>) -> Self {
        TextPair {
            original: original.into(),
            corrected: corrected.into(),
        }
    }
}

/// Split CSV text into records of fields
fn parse_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(SpellfixError::Dataset(
            "unterminated quoted field".to_string(),
        ));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

/// Parse pairs from CSV text. Rows with a blank side are dropped.
pub fn parse_pairs(text: &str) -> Result<Vec<TextPair>> {
    let mut records = parse_records(text)?.into_iter();
    let header = records
        .next()
        .ok_or_else(|| SpellfixError::Dataset("empty CSV".to_string()))?;

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| SpellfixError::Dataset(format!("missing column '{}'", name)))
    };
    let original_idx = column(ORIGINAL_COLUMN)?;
    let corrected_idx = column(CORRECTED_COLUMN)?;

    let mut pairs = Vec::new();
    let mut dropped = 0usize;
    for record in records {
        let original = record.get(original_idx).map(|s| s.trim()).unwrap_or("");
        let corrected = record.get(corrected_idx).map(|s| s.trim()).unwrap_or("");
        if original.is_empty() || corrected.is_empty() {
            dropped += 1;
            continue;
        }
        pairs.push(TextPair::new(original, corrected));
    }

    if dropped > 0 {
        log::debug!("dropped {} rows with a blank side", dropped);
    }
    Ok(pairs)
}

/// Read pairs from a CSV file
pub fn read_pairs<P: AsRef<Path>>(path: P) -> Result<Vec<TextPair>> {
    let text = fs::read_to_string(path.as_ref())?;
    let pairs = parse_pairs(&text)?;
    log::info!(
        "read {} sentence pairs from {}",
        pairs.len(),
        path.as_ref().display()
    );
    Ok(pairs)
}
