//! Candle token classifier
//!
//! Handles:
//! - Loading tagger weights from a bincode bundle (`tagger.bin`)
//! - Per-sub-token forward pass: embedding -> hidden (ReLU) -> tag head
//! - Softmax over the tag vocabulary
//!
//! Bundle tensors, `(out, in)` layout for linear weights:
//! `embedding.weight [vocab, hidden]`, `hidden.weight [hidden, hidden]`,
//! `hidden.bias [hidden]`, `classifier.weight [tags, hidden]`,
//! `classifier.bias [tags]`.

use super::TagClassifier;
use crate::error::{Result, SpellfixError};
use crate::tokenizer::WordEncoding;
use candle_core::{DType, Device, Module, Tensor, D};
use candle_nn::{Embedding, Linear, VarBuilder, VarMap};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Shape metadata stored next to the weights
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TaggerConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_tags: usize,
}

/// One named, flattened tensor
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TensorData {
    pub name: String,
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// Serialized tagger: config + named tensors
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TaggerBundle {
    pub config: TaggerConfig,
    pub tensors: Vec<TensorData>,
}

impl TaggerBundle {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        log::info!(
            "loading tagger weights from {} ({} bytes)",
            path.as_ref().display(),
            bytes.len()
        );
        Ok(bincode::deserialize(&bytes)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, bincode::serialize(self)?)?;
        Ok(())
    }

    pub fn parameter_count(&self) -> usize {
        self.tensors.iter().map(|t| t.data.len()).sum()
    }

    /// Randomly initialised weights for `config`, tensors sorted by name
    pub fn initialize(config: TaggerConfig) -> Result<Self> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        candle_nn::embedding(config.vocab_size, config.hidden_size, vb.pp("embedding"))?;
        candle_nn::linear(config.hidden_size, config.hidden_size, vb.pp("hidden"))?;
        candle_nn::linear(config.hidden_size, config.num_tags, vb.pp("classifier"))?;

        let vars = varmap
            .data()
            .lock()
            .map_err(|_| SpellfixError::Bundle("weight map lock poisoned".to_string()))?;
        let mut tensors = Vec::with_capacity(vars.len());
        for (name, var) in vars.iter() {
            tensors.push(TensorData {
                name: name.clone(),
                shape: var.shape().dims().to_vec(),
                data: var.flatten_all()?.to_vec1::<f32>()?,
            });
        }
        tensors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(TaggerBundle { config, tensors })
    }
}

/// Token classifier running on Candle
pub struct CandleTagger {
    config: TaggerConfig,
    device: Device,
    embedding: Embedding,
    hidden: Linear,
    classifier: Linear,
}

impl CandleTagger {
    /// Build from an in-memory bundle; tensor shapes must match the config
    pub fn from_bundle(bundle: TaggerBundle) -> Result<Self> {
        let device = Device::Cpu;
        let TaggerBundle { config, tensors } = bundle;

        let mut named = HashMap::with_capacity(tensors.len());
        for tensor in tensors {
            let expected: usize = tensor.shape.iter().product();
            if expected != tensor.data.len() {
                return Err(SpellfixError::Bundle(format!(
                    "tensor '{}' has {} values for shape {:?}",
                    tensor.name,
                    tensor.data.len(),
                    tensor.shape
                )));
            }
            let value = Tensor::from_vec(tensor.data, tensor.shape, &device)?;
            named.insert(tensor.name, value);
        }

        let vb = VarBuilder::from_tensors(named, DType::F32, &device);
        let embedding = candle_nn::embedding(config.vocab_size, config.hidden_size, vb.pp("embedding"))?;
        let hidden = candle_nn::linear(config.hidden_size, config.hidden_size, vb.pp("hidden"))?;
        let classifier = candle_nn::linear(config.hidden_size, config.num_tags, vb.pp("classifier"))?;

        Ok(CandleTagger {
            config,
            device,
            embedding,
            hidden,
            classifier,
        })
    }

    /// Load `tagger.bin`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let tagger = Self::from_bundle(TaggerBundle::load(path)?)?;
        log::info!(
            "tagger ready: vocab={} hidden={} tags={}",
            tagger.config.vocab_size,
            tagger.config.hidden_size,
            tagger.config.num_tags
        );
        Ok(tagger)
    }

    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    /// Logits `[seq_len, num_tags]` for a `[seq_len]` id tensor
    fn forward(&self, ids: &Tensor) -> candle_core::Result<Tensor> {
        let embedded = self.embedding.forward(ids)?;
        let hidden = self.hidden.forward(&embedded)?.relu()?;
        self.classifier.forward(&hidden)
    }
}

impl TagClassifier for CandleTagger {
    fn num_tags(&self) -> usize {
        self.config.num_tags
    }

    fn classify(&self, encoding: &WordEncoding) -> Result<Vec<Vec<f32>>> {
        if encoding.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(&bad) = encoding
            .input_ids
            .iter()
            .find(|&&id| id as usize >= self.config.vocab_size)
        {
            return Err(SpellfixError::Config(format!(
                "token id {} outside tagger vocabulary of {}",
                bad, self.config.vocab_size
            )));
        }

        let ids = Tensor::new(encoding.input_ids.as_slice(), &self.device)?;
        let logits = self.forward(&ids)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?;
        Ok(probs.to_vec2::<f32>()?)
    }
}
