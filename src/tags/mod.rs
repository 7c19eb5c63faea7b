//! Edit tags: the per-token labels the tagger predicts
//!
//! # Components
//! - `align.rs`: Diff two token sequences into per-token tags + gap inserts
//! - `vocab.rs`: Tag vocabulary (tag symbol <-> dense id), JSON persisted
//! - `apply.rs`: Rebuild a corrected sentence from tokens and tags
//!
//! Tags travel as strings on disk (`KEEP`, `DELETE`, `REPLACE_<word>`,
//! `INSERT_<word>`) and as [`Tag`] values everywhere else.

pub mod align;
pub mod apply;
pub mod vocab;

pub use align::{diff_to_tags, tags_from_opcodes, OpKind, Opcode};
pub use apply::{apply_tags, apply_tags_with_gaps};
pub use vocab::TagVocab;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const KEEP: &str = "KEEP";
pub const DELETE: &str = "DELETE";
pub const REPLACE_PREFIX: &str = "REPLACE_";
pub const INSERT_PREFIX: &str = "INSERT_";
pub const KEEP_GAP: &str = "KEEP_GAP";

/// Edit operation attached to one original token (or, for `Insert`, to a gap)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Token is retained verbatim
    Keep,
    /// Token is removed
    Delete,
    /// Token is replaced by the payload word
    Replace(String),
    /// Payload word is inserted at a gap
    Insert(String),
    /// Symbol this crate does not understand, kept verbatim
    Other(String),
}

impl Tag {
    /// Decode a tag symbol. Never fails: unknown symbols become `Other`.
    pub fn parse(symbol: &str) -> Tag {
        match symbol {
            KEEP => Tag::Keep,
            DELETE => Tag::Delete,
            _ => {
                if let Some(word) = symbol.strip_prefix(REPLACE_PREFIX) {
                    Tag::Replace(word.to_string())
                } else if let Some(word) = symbol.strip_prefix(INSERT_PREFIX) {
                    Tag::Insert(word.to_string())
                } else {
                    Tag::Other(symbol.to_string())
                }
            }
        }
    }

    pub fn replace(word: impl Into<String>) -> Tag {
        Tag::Replace(word.into())
    }

    pub fn insert(word: impl Into<String>) -> Tag {
        Tag::Insert(word.into())
    }

    /// Word carried by `Replace`/`Insert`
    pub fn payload(&self) -> Option<&str> {
        match self {
            Tag::Replace(word) | Tag::Insert(word) => Some(word),
            _ => None,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Tag::Keep)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Keep => f.write_str(KEEP),
            Tag::Delete => f.write_str(DELETE),
            Tag::Replace(word) => write!(f, "{}{}", REPLACE_PREFIX, word),
            Tag::Insert(word) => write!(f, "{}{}", INSERT_PREFIX, word),
            Tag::Other(symbol) => f.write_str(symbol),
        }
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        Ok(Tag::parse(&symbol))
    }
}

/// Insertions recorded at one gap between original tokens
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GapTag {
    inserts: Vec<String>,
}

impl GapTag {
    pub fn keep() -> Self {
        Self::default()
    }

    pub fn is_keep(&self) -> bool {
        self.inserts.is_empty()
    }

    /// Words inserted at this gap, in order
    pub fn inserts(&self) -> &[String] {
        &self.inserts
    }

    pub(crate) fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inserts.extend(words.into_iter().map(Into::into));
    }
}

impl fmt::Display for GapTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inserts.is_empty() {
            return f.write_str(KEEP_GAP);
        }
        for (i, word) in self.inserts.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}{}", INSERT_PREFIX, word)?;
        }
        Ok(())
    }
}

/// One aligned training pair: original tokens, one tag per token and
/// `tokens.len() + 1` gap annotations. Built only by the aligner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedExample {
    tokens: Vec<String>,
    tags: Vec<Tag>,
    gap_tags: Vec<GapTag>,
}

impl TaggedExample {
    pub(crate) fn new(tokens: Vec<String>, tags: Vec<Tag>, gap_tags: Vec<GapTag>) -> Self {
        assert_eq!(
            tags.len(),
            tokens.len(),
            "alignment produced {} tags for {} tokens",
            tags.len(),
            tokens.len()
        );
        assert_eq!(gap_tags.len(), tokens.len() + 1);
        TaggedExample {
            tokens,
            tags,
            gap_tags,
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn gap_tags(&self) -> &[GapTag] {
        &self.gap_tags
    }

    /// Corrected sentence implied by the per-token tags only
    pub fn apply(&self) -> String {
        apply_tags(&self.tokens, &self.tags)
    }

    /// Corrected sentence including gap insertions
    pub fn reconstruct(&self) -> String {
        apply_tags_with_gaps(&self.tokens, &self.tags, &self.gap_tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols() {
        assert_eq!(Tag::parse("KEEP"), Tag::Keep);
        assert_eq!(Tag::parse("DELETE"), Tag::Delete);
        assert_eq!(Tag::parse("REPLACE_full"), Tag::replace("full"));
        assert_eq!(Tag::parse("INSERT_the"), Tag::insert("the"));
    }

    #[test]
    fn test_payload_may_contain_separator() {
        let tag = Tag::parse("REPLACE_snake_case");
        assert_eq!(tag.payload(), Some("snake_case"));
        assert_eq!(tag.to_string(), "REPLACE_snake_case");
    }

    #[test]
    fn test_unknown_symbol_is_other() {
        assert_eq!(Tag::parse("SPLIT"), Tag::Other("SPLIT".to_string()));
        assert_eq!(Tag::parse("keep").to_string(), "keep");
    }

    #[test]
    fn test_empty_payload_round_trips() {
        for tag in [Tag::replace(""), Tag::insert("")] {
            assert_eq!(Tag::parse(&tag.to_string()), tag);
        }
        assert_eq!(Tag::parse("REPLACE_"), Tag::replace(""));
    }

    #[test]
    fn test_gap_display() {
        let mut gap = GapTag::keep();
        assert_eq!(gap.to_string(), "KEEP_GAP");
        gap.extend(["full", "stack"]);
        assert_eq!(gap.to_string(), "INSERT_full INSERT_stack");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&vec![Tag::Keep, Tag::replace("web")]).unwrap();
        assert_eq!(json, r#"["KEEP","REPLACE_web"]"#);
        let back: Vec<Tag> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Tag::Keep, Tag::replace("web")]);
    }
}
