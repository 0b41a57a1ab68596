use std::sync::Arc;

use tracing::debug;

use corridor_core::error::{Error, Result};
use corridor_core::traits::{EmbeddingProvider, VectorIndex};
use corridor_core::types::RetrievalResult;

pub const DEFAULT_TOP_K: usize = 4;

/// Query-time view of one collection: embeds the question with the
/// ingestion model and delegates ranking to the index.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    collection: String,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>, collection: impl Into<String>) -> Self {
        Self { embedder, index, collection: collection.into() }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(Error::InvalidConfig("k must be at least 1".to_string()));
        }
        if !self.index.exists(&self.collection).await? {
            return Err(Error::CollectionNotFound(self.collection.clone()));
        }
        let vector = self.embedder.embed(query).await?;
        let hits = self.index.query(&self.collection, &vector, k).await?;
        debug!(collection = %self.collection, k, hits = hits.len(), top = hits.first().map(|h| h.score), "Retrieved context");
        Ok(hits)
    }
}
