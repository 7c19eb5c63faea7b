//! Correction service: the inference boundary
//!
//! # Components
//! - `correction.rs`: Load the model, predict per-word tags, rebuild the sentence
//! - `endpoint.rs`: Request/response boundary (health, check-typos, status codes)
//! - `tally.rs`: Frequency of corrections across a batch of sentences

pub mod correction;
pub mod endpoint;
pub mod tally;

pub use correction::{CorrectionResponse, CorrectionService, TokenDetail};
pub use endpoint::{HealthStatus, ServiceError, TypoEndpoint};
pub use tally::{CorrectionTally, TallySummary};

#[cfg(test)]
pub(crate) mod testing {
    use super::CorrectionService;
    use crate::error::Result;
    use crate::model::TagClassifier;
    use crate::tags::TagVocab;
    use crate::tokenizer::{EncodeOptions, SubwordTokenizer, WordEncoding};
    use rustc_hash::FxHashMap;

    /// Word table tokenizer: specials are id 0, words longer than six
    /// characters split into two pieces.
    pub(crate) struct StubTokenizer;

    impl SubwordTokenizer for StubTokenizer {
        fn encode_words(&self, words: &[&str], options: &EncodeOptions) -> Result<WordEncoding> {
            let mut encoding = WordEncoding::default();
            let mut push = |id: u32, word: Option<usize>| {
                encoding.input_ids.push(id);
                encoding.attention_mask.push(1);
                encoding.word_ids.push(word);
            };

            push(0, None);
            for (idx, word) in words.iter().enumerate() {
                match *word {
                    "teh" => push(1, Some(idx)),
                    "cat" => push(2, Some(idx)),
                    "is" => push(3, Some(idx)),
                    w if w.chars().count() > 6 => {
                        push(4, Some(idx));
                        push(5, Some(idx));
                    }
                    _ => push(6, Some(idx)),
                }
            }
            push(0, None);

            encoding.fit(options, 0);
            Ok(encoding)
        }

        fn vocab_size(&self) -> usize {
            7
        }
    }

    /// Emits 0.7 for the routed tag of each input id and 0.1 elsewhere
    pub(crate) struct StubClassifier {
        num_tags: usize,
        routes: FxHashMap<u32, usize>,
    }

    /// Tag id used for ids without a route (`KEEP` in [`stub_vocab`])
    const FALLBACK_TAG: usize = 1;

    impl StubClassifier {
        pub(crate) fn new(num_tags: usize, routes: &[(u32, usize)]) -> Self {
            StubClassifier {
                num_tags,
                routes: routes.iter().copied().collect(),
            }
        }
    }

    impl TagClassifier for StubClassifier {
        fn num_tags(&self) -> usize {
            self.num_tags
        }

        fn classify(&self, encoding: &WordEncoding) -> Result<Vec<Vec<f32>>> {
            Ok(encoding
                .input_ids
                .iter()
                .map(|id| {
                    let winner = self.routes.get(id).copied().unwrap_or(FALLBACK_TAG);
                    (0..self.num_tags)
                        .map(|tag| if tag == winner { 0.7 } else { 0.1 })
                        .collect()
                })
                .collect())
        }
    }

    /// `DELETE`=0, `KEEP`=1, `REPLACE_building`=2, `REPLACE_the`=3
    pub(crate) fn stub_vocab() -> TagVocab {
        let map: FxHashMap<String, u32> = [
            ("DELETE", 0),
            ("KEEP", 1),
            ("REPLACE_building", 2),
            ("REPLACE_the", 3),
        ]
        .into_iter()
        .map(|(tag, id)| (tag.to_string(), id))
        .collect();
        TagVocab::from_tag_map(&map).unwrap()
    }

    /// `teh` -> `the`, long words -> `building` (continuation pieces say
    /// `DELETE` and must be ignored), everything else `KEEP`
    pub(crate) fn scripted_service() -> CorrectionService {
        let classifier = StubClassifier::new(4, &[(0, 0), (1, 3), (4, 2), (5, 0)]);
        CorrectionService::new(StubTokenizer, classifier, stub_vocab(), "stub-tagger").unwrap()
    }
}
