//! Embedding providers: a local candle BERT model, an Ollama-served model,
//! and a deterministic hashing embedder for tests.

use std::sync::Arc;

use corridor_core::config::{expand_path, EmbeddingBackend, EmbeddingSettings};
use corridor_core::traits::EmbeddingProvider;
use corridor_core::upstream::UpstreamPolicy;
use corridor_core::Result;
use tracing::info;

mod bert;
mod device;
mod hash;
mod ollama;
mod pool;
mod tokenize;

pub use bert::LocalEmbedder;
pub use device::select_device;
pub use hash::HashEmbedder;
pub use ollama::OllamaEmbedder;
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_batch;

/// Construct the provider selected by `embedding.provider`.
pub fn build_embedder(settings: &EmbeddingSettings, policy: UpstreamPolicy) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder: Arc<dyn EmbeddingProvider> = match settings.provider {
        EmbeddingBackend::Local => Arc::new(LocalEmbedder::load(&settings.model, &expand_path(&settings.model_dir))?),
        EmbeddingBackend::Hash => Arc::new(HashEmbedder::new(settings.dimension)),
        EmbeddingBackend::Ollama => {
            Arc::new(OllamaEmbedder::new(&settings.base_url, &settings.model, settings.dimension, policy))
        }
    };
    info!(provider = ?settings.provider, model = embedder.model_id(), dim = embedder.dim(), "Embedding provider ready");
    Ok(embedder)
}
