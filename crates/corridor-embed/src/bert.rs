//! Sentence embeddings from a local BERT-family checkpoint
//! (`all-MiniLM-L6-v2` by default) running on candle.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use corridor_core::error::Error;
use corridor_core::traits::EmbeddingProvider;
use corridor_core::types::Availability;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_batch;

/// Sentence-transformers checkpoints are trained on sequences of this length.
const MAX_SEQ_LEN: usize = 256;

#[derive(Deserialize)]
struct ModelShape {
    hidden_size: usize,
    max_position_embeddings: usize,
}

struct BertEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    max_len: usize,
}

impl BertEncoder {
    fn load(model_dir: &Path) -> Result<(Self, usize)> {
        let device = select_device();
        info!(dir = %model_dir.display(), "Loading embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("Failed to read {}: {}", config_path.display(), e))?;
        let config: BertConfig = serde_json::from_str(&raw)?;
        let shape: ModelShape = serde_json::from_str(&raw)?;

        let safetensors = model_dir.join("model.safetensors");
        let tensors: HashMap<String, Tensor> = if safetensors.exists() {
            candle_core::safetensors::load(&safetensors, &device)?
        } else {
            let weights_path = model_dir.join("pytorch_model.bin");
            candle_core::pickle::read_all(&weights_path)?.into_iter().collect()
        };
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;
        info!(dim = shape.hidden_size, "Embedding model loaded");

        let max_len = shape.max_position_embeddings.min(MAX_SEQ_LEN);
        Ok((Self { model, tokenizer, device, max_len }, shape.hidden_size))
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let out: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        debug!(batch = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "Encoded batch");
        Ok(out)
    }
}

/// In-process embedder. Inference runs on the blocking thread pool.
pub struct LocalEmbedder {
    inner: Arc<BertEncoder>,
    model_id: String,
    dim: usize,
}

impl LocalEmbedder {
    pub fn load(model_id: &str, model_dir: &Path) -> corridor_core::Result<Self> {
        let (inner, dim) = BertEncoder::load(model_dir).map_err(Error::model)?;
        Ok(Self { inner: Arc::new(inner), model_id: model_id.to_string(), dim })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> corridor_core::Result<Vec<f32>> {
        let mut out = self.embed_batch(&[text.to_string()]).await?;
        out.pop().ok_or_else(|| Error::model("model returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[String]) -> corridor_core::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inner = Arc::clone(&self.inner);
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || inner.encode(&texts))
            .await
            .map_err(Error::model)?
            .map_err(Error::model)
    }

    async fn health_check(&self) -> Availability {
        Availability::Available
    }
}
