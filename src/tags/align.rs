//! Alignment: turn an (original, corrected) token pair into edit tags
//!
//! Handles:
//! - Token-level diff (longest matching block recursion) into opcodes
//! - Opcode walk into one tag per original token
//! - Gap insert annotations for insertions and unequal-length replacements
//!
//! A single deleted token directly followed by a single inserted token is
//! fused into `REPLACE_<word>`. Every other delete/insert combination stays
//! `DELETE` + gap insert, so multi-token replacements never produce
//! multi-token replace runs.

use super::{GapTag, Tag, TaggedExample};
use rustc_hash::FxHashMap;
use std::ops::Range;

/// Corrected sequences at least this long get the popular-token heuristic
const AUTOJUNK_MIN_LEN: usize = 200;

/// Kind of one diff opcode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    Equal,
    Delete,
    Insert,
    Replace,
}

/// One diff opcode: `orig[orig]` becomes `corr[corr]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub kind: OpKind,
    pub orig: Range<usize>,
    pub corr: Range<usize>,
}

impl Opcode {
    pub fn new(kind: OpKind, orig: Range<usize>, corr: Range<usize>) -> Self {
        Opcode { kind, orig, corr }
    }
}

/// Matching block: `a[a_start..a_start + len] == b[b_start..b_start + len]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Block {
    a_start: usize,
    b_start: usize,
    len: usize,
}

/// Token sequence matcher (Ratcliff/Obershelp)
struct SequenceMatcher<'a, S: AsRef<str>> {
    a: &'a [S],
    b: &'a [S],
    /// Token -> positions in `b`, popular tokens removed
    b2j: FxHashMap<&'a str, Vec<usize>>,
}

impl<'a, S: AsRef<str>> SequenceMatcher<'a, S> {
    fn new(a: &'a [S], b: &'a [S]) -> Self {
        let mut b2j: FxHashMap<&'a str, Vec<usize>> = FxHashMap::default();
        for (j, token) in b.iter().enumerate() {
            b2j.entry(token.as_ref()).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let ntest = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        SequenceMatcher { a, b, b2j }
    }

    fn eq_at(&self, i: usize, j: usize) -> bool {
        self.a[i].as_ref() == self.b[j].as_ref()
    }

    /// Longest block in `a[alo..ahi]` x `b[blo..bhi]`; earliest in `a`, then in `b`
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let mut best = Block {
            a_start: alo,
            b_start: blo,
            len: 0,
        };
        let mut j2len: FxHashMap<usize, usize> = FxHashMap::default();

        for i in alo..ahi {
            let mut next_j2len = FxHashMap::default();
            if let Some(positions) = self.b2j.get(self.a[i].as_ref()) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = if j > 0 {
                        j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                    } else {
                        1
                    };
                    next_j2len.insert(j, k);
                    if k > best.len {
                        best = Block {
                            a_start: i + 1 - k,
                            b_start: j + 1 - k,
                            len: k,
                        };
                    }
                }
            }
            j2len = next_j2len;
        }

        // Popular tokens never seed a match but may still extend one
        while best.a_start > alo && best.b_start > blo && self.eq_at(best.a_start - 1, best.b_start - 1)
        {
            best.a_start -= 1;
            best.b_start -= 1;
            best.len += 1;
        }
        while best.a_start + best.len < ahi
            && best.b_start + best.len < bhi
            && self.eq_at(best.a_start + best.len, best.b_start + best.len)
        {
            best.len += 1;
        }

        best
    }

    fn matching_blocks(&self) -> Vec<Block> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);
            if block.len == 0 {
                continue;
            }
            blocks.push(block);
            if alo < block.a_start && blo < block.b_start {
                queue.push((alo, block.a_start, blo, block.b_start));
            }
            if block.a_start + block.len < ahi && block.b_start + block.len < bhi {
                queue.push((block.a_start + block.len, ahi, block.b_start + block.len, bhi));
            }
        }
        blocks.sort();

        // Collapse adjacent blocks
        let mut collapsed: Vec<Block> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match collapsed.last_mut() {
                Some(last)
                    if last.a_start + last.len == block.a_start
                        && last.b_start + last.len == block.b_start =>
                {
                    last.len += block.len;
                }
                _ => collapsed.push(block),
            }
        }
        collapsed.push(Block {
            a_start: la,
            b_start: lb,
            len: 0,
        });
        collapsed
    }

    fn opcodes(&self) -> Vec<Opcode> {
        let (mut i, mut j) = (0, 0);
        let mut opcodes = Vec::new();

        for block in self.matching_blocks() {
            let kind = match (i < block.a_start, j < block.b_start) {
                (true, true) => Some(OpKind::Replace),
                (true, false) => Some(OpKind::Delete),
                (false, true) => Some(OpKind::Insert),
                (false, false) => None,
            };
            if let Some(kind) = kind {
                opcodes.push(Opcode::new(kind, i..block.a_start, j..block.b_start));
            }
            i = block.a_start + block.len;
            j = block.b_start + block.len;
            if block.len > 0 {
                opcodes.push(Opcode::new(OpKind::Equal, block.a_start..i, block.b_start..j));
            }
        }

        opcodes
    }
}

/// Diff opcodes turning `orig` into `corr` (case-sensitive, token-granular)
pub fn diff_opcodes<S: AsRef<str>>(orig: &[S], corr: &[S]) -> Vec<Opcode> {
    SequenceMatcher::new(orig, corr).opcodes()
}

/// Align two token sequences and tag every original token
pub fn diff_to_tags<S: AsRef<str>>(orig: &[S], corr: &[S]) -> TaggedExample {
    let opcodes = diff_opcodes(orig, corr);
    tags_from_opcodes(orig, corr, &opcodes)
}

/// Walk `opcodes` left to right and emit tags per the tagging policy.
///
/// Panics if the opcodes do not cover `orig` exactly once; that is an
/// alignment bug, not bad input.
pub fn tags_from_opcodes<S: AsRef<str>>(orig: &[S], corr: &[S], opcodes: &[Opcode]) -> TaggedExample {
    let mut tags: Vec<Tag> = Vec::with_capacity(orig.len());
    let mut gaps = vec![GapTag::keep(); orig.len() + 1];
    let corr_words = |range: &Range<usize>| corr[range.clone()].iter().map(|t| t.as_ref().to_string());

    let mut idx = 0;
    while idx < opcodes.len() {
        let op = &opcodes[idx];
        match op.kind {
            OpKind::Equal => {
                tags.extend(std::iter::repeat(Tag::Keep).take(op.orig.len()));
            }
            OpKind::Delete => {
                let fused = opcodes.get(idx + 1).filter(|next| {
                    next.kind == OpKind::Insert && op.orig.len() == 1 && next.corr.len() == 1
                });
                match fused {
                    Some(next) => {
                        tags.push(Tag::Replace(corr[next.corr.start].as_ref().to_string()));
                        idx += 1;
                    }
                    None => tags.extend(std::iter::repeat(Tag::Delete).take(op.orig.len())),
                }
            }
            OpKind::Replace => {
                if op.orig.len() == op.corr.len() {
                    tags.extend(corr_words(&op.corr).map(Tag::Replace));
                } else {
                    tags.extend(std::iter::repeat(Tag::Delete).take(op.orig.len()));
                    gaps[tags.len()].extend(corr_words(&op.corr));
                }
            }
            OpKind::Insert => {
                gaps[tags.len()].extend(corr_words(&op.corr));
            }
        }
        idx += 1;
    }

    let tokens = orig.iter().map(|t| t.as_ref().to_string()).collect();
    TaggedExample::new(tokens, tags, gaps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    #[test]
    fn test_identity_is_all_keep() {
        let tokens = split("the quick brown fox the end");
        let example = diff_to_tags(&tokens, &tokens);
        assert!(example.tags().iter().all(Tag::is_keep));
        assert!(example.gap_tags().iter().all(GapTag::is_keep));
        assert_eq!(example.gap_tags().len(), tokens.len() + 1);
    }

    #[test]
    fn test_deletion() {
        let example = diff_to_tags(&["a", "b", "c"], &["a", "c"]);
        assert_eq!(example.tags(), &[Tag::Keep, Tag::Delete, Tag::Keep]);
        assert_eq!(example.apply(), "a c");
    }

    #[test]
    fn test_single_replace() {
        let example = diff_to_tags(&["fuil", "stack"], &["full", "stack"]);
        assert_eq!(example.tags(), &[Tag::replace("full"), Tag::Keep]);
        assert_eq!(example.apply(), "full stack");
    }

    #[test]
    fn test_equal_length_replace_is_pairwise() {
        let orig = split("teh quikc fox");
        let corr = split("the quick fox");
        let example = diff_to_tags(&orig, &corr);
        assert_eq!(
            example.tags(),
            &[Tag::replace("the"), Tag::replace("quick"), Tag::Keep]
        );
        assert_eq!(example.apply(), corr.join(" "));
    }

    #[test]
    fn test_insertion_goes_to_gap() {
        let example = diff_to_tags(&["a", "c"], &["a", "b", "x", "c"]);
        assert_eq!(example.tags(), &[Tag::Keep, Tag::Keep]);
        assert_eq!(example.gap_tags()[1].to_string(), "INSERT_b INSERT_x");
        assert!(example.gap_tags()[0].is_keep());
        assert!(example.gap_tags()[2].is_keep());
        assert_eq!(example.reconstruct(), "a b x c");
    }

    #[test]
    fn test_unequal_replace_splits_into_delete_and_gap() {
        let orig = split("a fuil stack engineer huilding web apps");
        let corr = split("a full-stack engineer building web apps");
        let example = diff_to_tags(&orig, &corr);

        assert_eq!(example.tags().len(), orig.len());
        assert_eq!(
            example.tags(),
            &[
                Tag::Keep,
                Tag::Delete,
                Tag::Delete,
                Tag::Keep,
                Tag::replace("building"),
                Tag::Keep,
                Tag::Keep,
            ]
        );
        assert_eq!(example.gap_tags()[3].to_string(), "INSERT_full-stack");
        assert_eq!(example.reconstruct(), corr.join(" "));
    }

    #[test]
    fn test_adjacent_delete_insert_fuses() {
        let orig = ["a", "fuil", "b"];
        let corr = ["a", "full", "b"];
        let opcodes = vec![
            Opcode::new(OpKind::Equal, 0..1, 0..1),
            Opcode::new(OpKind::Delete, 1..2, 1..1),
            Opcode::new(OpKind::Insert, 2..2, 1..2),
            Opcode::new(OpKind::Equal, 2..3, 2..3),
        ];
        let example = tags_from_opcodes(&orig, &corr, &opcodes);
        assert_eq!(example.tags(), &[Tag::Keep, Tag::replace("full"), Tag::Keep]);
        assert!(example.gap_tags().iter().all(GapTag::is_keep));
    }

    #[test]
    #[should_panic(expected = "alignment produced 1 tags for 2 tokens")]
    fn test_uncovered_opcodes_panic() {
        let opcodes = vec![Opcode::new(OpKind::Equal, 0..1, 0..1)];
        tags_from_opcodes(&["a", "b"], &["a", "b"], &opcodes);
    }

    #[test]
    fn test_multi_token_delete_insert_does_not_fuse() {
        let orig = ["x", "y", "z"];
        let corr = ["w", "z"];
        let opcodes = vec![
            Opcode::new(OpKind::Delete, 0..2, 0..0),
            Opcode::new(OpKind::Insert, 2..2, 0..1),
            Opcode::new(OpKind::Equal, 2..3, 1..2),
        ];
        let example = tags_from_opcodes(&orig, &corr, &opcodes);
        assert_eq!(example.tags(), &[Tag::Delete, Tag::Delete, Tag::Keep]);
        assert_eq!(example.gap_tags()[2].inserts(), &["w".to_string()]);
        assert_eq!(example.reconstruct(), "w z");
    }

    #[test]
    fn test_empty_sides() {
        let empty: [&str; 0] = [];
        let example = diff_to_tags(&empty, &["new", "words"]);
        assert!(example.tags().is_empty());
        assert_eq!(example.gap_tags()[0].to_string(), "INSERT_new INSERT_words");
        assert_eq!(example.reconstruct(), "new words");

        let example = diff_to_tags(&["gone", "away"], &empty);
        assert_eq!(example.tags(), &[Tag::Delete, Tag::Delete]);
        assert_eq!(example.reconstruct(), "");

        let example = diff_to_tags(&empty, &empty);
        assert!(example.tags().is_empty());
        assert_eq!(example.gap_tags().len(), 1);
    }

    #[test]
    fn test_case_sensitive() {
        let example = diff_to_tags(&["Rust", "code"], &["rust", "code"]);
        assert_eq!(example.tags(), &[Tag::replace("rust"), Tag::Keep]);
    }

    #[test]
    fn test_duplicate_tokens_are_positional() {
        let orig = split("the the cat");
        let corr = split("the cat");
        let example = diff_to_tags(&orig, &corr);
        assert_eq!(example.tags().len(), 3);
        assert_eq!(example.tags().iter().filter(|t| **t == Tag::Delete).count(), 1);
        assert_eq!(example.apply(), "the cat");
    }

    #[test]
    fn test_opcodes_cover_both_sides() {
        let orig = split("one two three four five");
        let corr = split("zero one too three five six");
        let opcodes = diff_opcodes(&orig, &corr);

        let mut i = 0;
        let mut j = 0;
        for op in &opcodes {
            assert_eq!(op.orig.start, i);
            assert_eq!(op.corr.start, j);
            i = op.orig.end;
            j = op.corr.end;
        }
        assert_eq!((i, j), (orig.len(), corr.len()));
    }

    #[test]
    fn test_tag_count_invariant_on_long_input() {
        // Long enough to trigger the popular-token heuristic
        let orig: Vec<String> = (0..260).map(|i| format!("w{}", i % 7)).collect();
        let mut corr = orig.clone();
        corr.remove(40);
        corr.insert(100, "extra".to_string());
        corr[150] = "changed".to_string();

        let example = diff_to_tags(&orig, &corr);
        assert_eq!(example.tags().len(), orig.len());
        assert_eq!(example.gap_tags().len(), orig.len() + 1);
        assert_eq!(example.reconstruct(), corr.join(" "));
    }
}
