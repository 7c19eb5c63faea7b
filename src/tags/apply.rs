//! Reconstruction: apply predicted tags to the original tokens
//!
//! `KEEP` emits the token, `DELETE` emits nothing, `REPLACE_<w>` emits `w`.
//! Anything else keeps the original token: a bad prediction must never lose
//! text. Pieces are joined with single spaces.

use super::{GapTag, Tag};

fn apply_one<'a>(token: &'a str, tag: &'a Tag) -> Option<&'a str> {
    match tag {
        Tag::Keep => Some(token),
        Tag::Delete => None,
        Tag::Replace(word) => Some(word.as_str()),
        Tag::Insert(_) | Tag::Other(_) => Some(token),
    }
}

/// Rebuild a sentence from per-token tags. Gap insertions are not consumed.
pub fn apply_tags<S: AsRef<str>>(tokens: &[S], tags: &[Tag]) -> String {
    debug_assert_eq!(tokens.len(), tags.len(), "one tag per token");
    tokens
        .iter()
        .zip(tags)
        .filter_map(|(token, tag)| apply_one(token.as_ref(), tag))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rebuild a sentence from per-token tags plus gap insertions.
///
/// `gaps[g]` is emitted before token `g`; `gaps[tokens.len()]` goes last.
pub fn apply_tags_with_gaps<S: AsRef<str>>(tokens: &[S], tags: &[Tag], gaps: &[GapTag]) -> String {
    debug_assert_eq!(tokens.len(), tags.len(), "one tag per token");
    debug_assert_eq!(gaps.len(), tokens.len() + 1, "one gap per token boundary");

    let mut pieces: Vec<&str> = Vec::with_capacity(tokens.len() + gaps.len());
    for (idx, (token, tag)) in tokens.iter().zip(tags).enumerate() {
        if let Some(gap) = gaps.get(idx) {
            pieces.extend(gap.inserts().iter().map(String::as_str));
        }
        if let Some(piece) = apply_one(token.as_ref(), tag) {
            pieces.push(piece);
        }
    }
    if let Some(last) = gaps.get(tokens.len()) {
        pieces.extend(last.inserts().iter().map(String::as_str));
    }
    pieces.join(" ")
}
