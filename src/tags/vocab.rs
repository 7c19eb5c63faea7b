//! Tag vocabulary: tag symbol <-> dense id
//!
//! Handles:
//! - Building the vocabulary from aligned examples (sorted, deterministic)
//! - `tag2id.json` persistence shared by dataset preparation and inference
//! - Id lookups with the `KEEP` fallback used during label assignment
//!
//! The vocabulary is write-once: inference loads exactly what training saw.

use super::{Tag, TaggedExample};
use crate::error::{Result, SpellfixError};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fs;
use std::path::Path;

/// Frozen tag vocabulary
#[derive(Clone, Debug)]
pub struct TagVocab {
    /// Id -> tag
    tags: Vec<Tag>,
    /// Tag -> id
    tag_to_id: FxHashMap<Tag, u32>,
}

impl TagVocab {
    /// Union of `KEEP`, `DELETE` and every per-token tag in `examples`.
    /// Gap inserts are not classification labels and are left out.
    pub fn build<'a, I>(examples: I) -> Self
    where
        I: IntoIterator<Item = &'a TaggedExample>,
    {
        let mut seen: FxHashSet<Tag> = FxHashSet::default();
        seen.insert(Tag::Keep);
        seen.insert(Tag::Delete);
        for example in examples {
            seen.extend(example.tags().iter().cloned());
        }

        let mut tags: Vec<Tag> = seen.into_iter().collect();
        tags.sort_by_cached_key(|tag| tag.to_string());
        Self::from_ordered(tags)
    }

    fn from_ordered(tags: Vec<Tag>) -> Self {
        let tag_to_id = tags
            .iter()
            .enumerate()
            .map(|(id, tag)| (tag.clone(), id as u32))
            .collect();
        TagVocab { tags, tag_to_id }
    }

    /// Rebuild from a `{symbol: id}` map. Ids must be exactly `0..len`
    /// and `KEEP` must be present.
    pub fn from_tag_map(map: &FxHashMap<String, u32>) -> Result<Self> {
        let mut slots: Vec<Option<Tag>> = vec![None; map.len()];
        for (symbol, &id) in map {
            let slot = slots.get_mut(id as usize).ok_or_else(|| {
                SpellfixError::InvalidVocab(format!(
                    "id {} for '{}' is out of range for {} tags",
                    id,
                    symbol,
                    map.len()
                ))
            })?;
            if slot.is_some() {
                return Err(SpellfixError::InvalidVocab(format!("duplicate id {}", id)));
            }
            *slot = Some(Tag::parse(symbol));
        }

        // Dense and unique ids over len slots means every slot is filled
        let tags: Vec<Tag> = slots.into_iter().flatten().collect();
        let vocab = Self::from_ordered(tags);
        if vocab.id(&Tag::Keep).is_none() {
            return Err(SpellfixError::InvalidVocab("missing KEEP tag".to_string()));
        }
        Ok(vocab)
    }

    /// Load `tag2id.json`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let map: FxHashMap<String, u32> = serde_json::from_str(&content)?;
        let vocab = Self::from_tag_map(&map)?;
        log::debug!(
            "loaded {} tags from {}",
            vocab.len(),
            path.as_ref().display()
        );
        Ok(vocab)
    }

    /// `{symbol: id}` as a JSON object, keys sorted
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .tags
            .iter()
            .enumerate()
            .map(|(id, tag)| (tag.to_string(), serde_json::Value::from(id as u32)))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Save as pretty-printed `tag2id.json`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(&self.to_json())?)?;
        Ok(())
    }

    pub fn id(&self, tag: &Tag) -> Option<u32> {
        self.tag_to_id.get(tag).copied()
    }

    pub fn keep_id(&self) -> u32 {
        // Present by construction in both `build` and `from_tag_map`
        self.id(&Tag::Keep).unwrap_or(0)
    }

    /// Id of `tag`, or `KEEP`'s id for a tag the vocabulary never saw
    pub fn id_or_keep(&self, tag: &Tag) -> u32 {
        match self.id(tag) {
            Some(id) => id,
            None => {
                log::warn!("tag '{}' not in vocabulary, labelling as KEEP", tag);
                self.keep_id()
            }
        }
    }

    pub fn tag(&self, id: u32) -> Option<&Tag> {
        self.tags.get(id as usize)
    }

    /// Tags in id order
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
