//! Token classifier boundary
//!
//! # Components
//! - `tagger.rs`: Candle token classifier loaded from a bincode weight bundle
//!
//! A classifier maps an encoded sequence to one probability distribution
//! over the tag vocabulary per sub-token position.

pub mod tagger;

pub use tagger::{CandleTagger, TaggerBundle, TaggerConfig, TensorData};

use crate::error::Result;
use crate::tokenizer::WordEncoding;

pub trait TagClassifier: Send + Sync {
    /// Size of the output distribution; must equal the tag vocabulary size
    fn num_tags(&self) -> usize;

    /// Row `i` is the tag distribution for sub-token `i` of `encoding`
    fn classify(&self, encoding: &WordEncoding) -> Result<Vec<Vec<f32>>>;
}

impl<T: TagClassifier + ?Sized> TagClassifier for Box<T> {
    fn num_tags(&self) -> usize {
        (**self).num_tags()
    }

    fn classify(&self, encoding: &WordEncoding) -> Result<Vec<Vec<f32>>> {
        (**self).classify(encoding)
    }
}

/// Index of the largest value (first one on ties)
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (idx, &value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}

/// `k` highest `(index, value)` pairs, descending; ties keep index order
pub fn top_k(values: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = values.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_top_k() {
        let ranked = top_k(&[0.1, 0.6, 0.3], 2);
        assert_eq!(ranked, vec![(1, 0.6), (2, 0.3)]);
        assert_eq!(top_k(&[0.2, 0.8], 5).len(), 2);
    }
}
