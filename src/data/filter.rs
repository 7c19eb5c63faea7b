//! Minimal-edit filter
//!
//! Keeps only sentence pairs whose correction is a light touch-up: large
//! rewrites cannot be expressed well as per-token tags.

/// Default ceiling on `distance / longest side`
pub const DEFAULT_THRESHOLD: f64 = 0.30;

/// Character-level Levenshtein distance
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// True when the case-insensitive edit distance is at most `threshold`
/// of the longer side's character length. Two empty sides are rejected.
pub fn minimal_edit(original: &str, corrected: &str, threshold: f64) -> bool {
    let longest = original.chars().count().max(corrected.chars().count());
    if longest == 0 {
        return false;
    }
    let distance = levenshtein(&original.to_lowercase(), &corrected.to_lowercase());
    distance as f64 / longest as f64 <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("same", "same"), 0);
        assert_eq!(levenshtein("héllo", "hello"), 1);
    }

    #[test]
    fn test_minimal_edit_threshold() {
        assert!(minimal_edit("I recieved it", "I received it", DEFAULT_THRESHOLD));
        assert!(!minimal_edit("abc", "xyz", DEFAULT_THRESHOLD));
        // 3 edits over 10 chars sits exactly on the boundary
        assert!(minimal_edit("abcdefghij", "abcdefgxyz", DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_case_is_ignored() {
        assert!(minimal_edit("HELLO WORLD", "hello world", 0.0));
    }

    #[test]
    fn test_both_empty_rejected() {
        assert!(!minimal_edit("", "", DEFAULT_THRESHOLD));
    }
}
