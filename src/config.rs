//! Service configuration
//!
//! A model directory holds everything inference needs:
//! `tokenizer.json`, `tag2id.json` and `tagger.bin`.

use crate::data::dataset::TAG_VOCAB_FILE;
use crate::error::{Result, SpellfixError};
use std::path::{Path, PathBuf};

pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const WEIGHTS_FILE: &str = "tagger.bin";
pub const DEFAULT_MODEL_DIR: &str = "models/edit_tag_v2";
pub const DEFAULT_MODEL_NAME: &str = "edit-tag-tagger-v2";
pub const DEFAULT_TOP_K: usize = 3;

/// Where the model lives and how the service answers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub model_dir: PathBuf,
    pub tokenizer_path: PathBuf,
    pub tag_vocab_path: PathBuf,
    pub weights_path: PathBuf,
    /// Reported in every response
    pub model_name: String,
    /// Default number of alternatives per token
    pub top_k: usize,
    /// Run one correction right after loading
    pub warm_up: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_model_dir(DEFAULT_MODEL_DIR)
    }
}

impl ServiceConfig {
    /// Standard file layout under `dir`
    pub fn from_model_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        ServiceConfig {
            model_dir: dir.to_path_buf(),
            tokenizer_path: dir.join(TOKENIZER_FILE),
            tag_vocab_path: dir.join(TAG_VOCAB_FILE),
            weights_path: dir.join(WEIGHTS_FILE),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            top_k: DEFAULT_TOP_K,
            warm_up: true,
        }
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_warm_up(mut self, warm_up: bool) -> Self {
        self.warm_up = warm_up;
        self
    }

    pub fn with_tokenizer_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.tokenizer_path = path.into();
        self
    }

    pub fn with_tag_vocab_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.tag_vocab_path = path.into();
        self
    }

    pub fn with_weights_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.weights_path = path.into();
        self
    }

    /// Check settings and that every model file exists
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(SpellfixError::Config("top_k must be >= 1".to_string()));
        }
        if self.model_name.trim().is_empty() {
            return Err(SpellfixError::Config("model_name must not be empty".to_string()));
        }

        let missing: Vec<String> = [
            &self.tokenizer_path,
            &self.tag_vocab_path,
            &self.weights_path,
        ]
        .iter()
        .filter(|path| !path.is_file())
        .map(|path| path.display().to_string())
        .collect();
        if !missing.is_empty() {
            return Err(SpellfixError::Config(format!(
                "missing model files: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}
