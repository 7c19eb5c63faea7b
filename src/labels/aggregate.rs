//! First-sub-token aggregation
//!
//! A tokenizer may split one word into several sub-tokens. Only the first
//! sub-token of a word carries the word's label; later pieces and special
//! positions (`word_id == None`) get [`IGNORE_INDEX`], which the loss and
//! the prediction read-out both skip.

use crate::tags::{Tag, TagVocab};

/// Label value excluded from the loss
pub const IGNORE_INDEX: i64 = -100;

fn is_first_subtoken(word_ids: &[Option<usize>], pos: usize) -> bool {
    word_ids[pos].is_some() && (pos == 0 || word_ids[pos - 1] != word_ids[pos])
}

/// `(position, word index)` of every word's first sub-token, in position order
pub fn first_subtoken_positions(word_ids: &[Option<usize>]) -> Vec<(usize, usize)> {
    word_ids
        .iter()
        .enumerate()
        .filter(|&(pos, _)| is_first_subtoken(word_ids, pos))
        .filter_map(|(pos, word)| word.map(|w| (pos, w)))
        .collect()
}

/// Training labels: one per sub-token position.
///
/// A word index past the end of `tags` is labelled `KEEP`; so is a tag the
/// vocabulary does not know. Neither happens with aligned input.
pub fn assign_labels(word_ids: &[Option<usize>], tags: &[Tag], vocab: &TagVocab) -> Vec<i64> {
    let mut labels = vec![IGNORE_INDEX; word_ids.len()];
    for (pos, word) in first_subtoken_positions(word_ids) {
        let id = match tags.get(word) {
            Some(tag) => vocab.id_or_keep(tag),
            None => vocab.keep_id(),
        };
        labels[pos] = id as i64;
    }
    labels
}

/// Inference read-out: the prediction at each of `word_count` words' first
/// sub-token, indexed by word. `per_subtoken` is indexed by sub-token
/// position; a word with no sub-token (truncated away) gets `None`.
pub fn select_predictions<'a, T>(
    word_ids: &[Option<usize>],
    per_subtoken: &'a [T],
    word_count: usize,
) -> Vec<Option<&'a T>> {
    debug_assert_eq!(word_ids.len(), per_subtoken.len());
    let mut picked = vec![None; word_count];
    for (pos, word) in first_subtoken_positions(word_ids) {
        if let Some(slot) = picked.get_mut(word) {
            *slot = per_subtoken.get(pos);
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::diff_to_tags;

    fn vocab() -> TagVocab {
        TagVocab::build(&[
            diff_to_tags(&["fuil", "stack"], &["full", "stack"]),
            diff_to_tags(&["a", "b"], &["a"]),
        ])
    }

    #[test]
    fn test_only_first_subtoken_labelled() {
        let vocab = vocab();
        // <s> fu il stack </s>
        let word_ids = [None, Some(0), Some(0), Some(1), None];
        let tags = [Tag::replace("full"), Tag::Keep];
        let labels = assign_labels(&word_ids, &tags, &vocab);

        let replace_id = vocab.id(&Tag::replace("full")).unwrap() as i64;
        let keep_id = vocab.keep_id() as i64;
        assert_eq!(labels, vec![IGNORE_INDEX, replace_id, IGNORE_INDEX, keep_id, IGNORE_INDEX]);
    }

    #[test]
    fn test_k_subtokens_have_one_label() {
        let vocab = vocab();
        for k in 1..6 {
            let word_ids: Vec<Option<usize>> = std::iter::once(None)
                .chain(std::iter::repeat(Some(0)).take(k))
                .chain(std::iter::once(None))
                .collect();
            let labels = assign_labels(&word_ids, &[Tag::Delete], &vocab);
            let labelled: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, l)| **l != IGNORE_INDEX)
                .map(|(pos, _)| pos)
                .collect();
            assert_eq!(labelled, vec![1]);
        }
    }

    #[test]
    fn test_missing_tag_defaults_to_keep() {
        let vocab = vocab();
        let word_ids = [Some(0), Some(1), Some(2)];
        let labels = assign_labels(&word_ids, &[Tag::Delete], &vocab);
        assert_eq!(labels[0], vocab.id(&Tag::Delete).unwrap() as i64);
        assert_eq!(labels[1], vocab.keep_id() as i64);
        assert_eq!(labels[2], vocab.keep_id() as i64);
    }

    #[test]
    fn test_padding_positions_ignored() {
        let vocab = vocab();
        let word_ids = [None, Some(0), None, None, None];
        let labels = assign_labels(&word_ids, &[Tag::Keep], &vocab);
        assert_eq!(labels.iter().filter(|&&l| l != IGNORE_INDEX).count(), 1);
    }

    #[test]
    fn test_select_predictions_one_per_word() {
        let word_ids = [None, Some(0), Some(0), Some(1), Some(2), Some(2), Some(2), None];
        let preds = ["bos", "w0a", "w0b", "w1", "w2a", "w2b", "w2c", "eos"];
        let picked: Vec<Option<&str>> = select_predictions(&word_ids, &preds, 3)
            .into_iter()
            .map(|p| p.copied())
            .collect();
        assert_eq!(picked, vec![Some("w0a"), Some("w1"), Some("w2a")]);
    }

    #[test]
    fn test_select_predictions_marks_truncated_words() {
        // word 2 lost to truncation
        let word_ids = [None, Some(0), Some(1), Some(1), None];
        let preds = [9, 10, 11, 12, 13];
        let picked = select_predictions(&word_ids, &preds, 3);
        assert_eq!(picked, vec![Some(&10), Some(&11), None]);
    }

    #[test]
    fn test_first_positions() {
        let word_ids = [None, Some(0), Some(1), Some(1), None];
        assert_eq!(first_subtoken_positions(&word_ids), vec![(1, 0), (2, 1)]);
        assert!(first_subtoken_positions(&[None, None]).is_empty());
    }
}
