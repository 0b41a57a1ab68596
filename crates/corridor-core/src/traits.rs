use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Availability, CollectionSchema, IndexEntry, RetrievalResult};

/// Maps text to fixed-length vectors. Implementations must be deterministic
/// for a given `model_id`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Stable identifier of the model, recorded next to each collection.
    fn model_id(&self) -> &str;
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Default implementation embeds texts one after another.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    async fn health_check(&self) -> Availability;
}

/// Stateless single-turn text generation. Always returns plain text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;

    async fn health_check(&self) -> Availability;
}

/// Persistent named collections of embedded chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replace the whole collection. Readers observe either the previous or
    /// the new contents, never a mix.
    async fn upsert_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
        entries: &[IndexEntry],
    ) -> Result<()>;

    /// Top-k entries by cosine similarity, best first; ties keep insertion order.
    async fn query(&self, name: &str, query_vector: &[f32], k: usize) -> Result<RetrievalResult>;

    async fn exists(&self, name: &str) -> Result<bool>;

    async fn health_check(&self) -> Availability;
}
