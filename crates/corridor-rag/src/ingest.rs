//! Full-corpus ingestion: chunk, embed in bounded-concurrency batches, then
//! replace the collection in one upsert.

use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use corridor_core::chunker::{Chunker, ChunkingConfig};
use corridor_core::error::{Error, Result};
use corridor_core::traits::{EmbeddingProvider, VectorIndex};
use corridor_core::types::{Chunk, CollectionSchema, Document, IndexEntry};

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub chunking: ChunkingConfig,
    pub batch_size: usize,
    pub concurrency: usize,
    pub show_progress: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { chunking: ChunkingConfig::default(), batch_size: 32, concurrency: 4, show_progress: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionReport {
    pub collection: String,
    pub document_count: usize,
    pub chunk_count: usize,
    pub elapsed: Duration,
}

pub struct Ingestor {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    options: IngestOptions,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>, options: IngestOptions) -> Self {
        Self { embedder, index, options }
    }

    pub async fn ingest(&self, documents: &[Document], collection: &str) -> Result<IngestionReport> {
        if documents.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let start = Instant::now();
        let chunker = Chunker::new(self.options.chunking)?;
        let chunks = chunker.split_all(documents);
        info!(documents = documents.len(), chunks = chunks.len(), collection, "Chunked corpus");

        let vectors = self.embed_all(&chunks).await?;
        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry::from_chunk(chunk, vector, collection))
            .collect();
        let chunk_count = entries.len();

        let schema = CollectionSchema { dimension: self.embedder.dim(), model_id: self.embedder.model_id().to_string() };
        self.index.upsert_collection(collection, &schema, &entries).await?;

        let report = IngestionReport {
            collection: collection.to_string(),
            document_count: documents.len(),
            chunk_count,
            elapsed: start.elapsed(),
        };
        info!(collection, documents = report.document_count, chunks = report.chunk_count, elapsed_ms = report.elapsed.as_millis() as u64, "Ingestion complete");
        Ok(report)
    }

    /// Vectors in chunk order. Batches complete in any order and are
    /// reassembled by their chunk offset.
    async fn embed_all(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let batch_size = self.options.batch_size.max(1);
        let dim = self.embedder.dim();
        let pb = self.progress_bar(chunks.len());

        let jobs = chunks.chunks(batch_size).enumerate().map(|(i, batch)| {
            let embedder = Arc::clone(&self.embedder);
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            async move {
                let vectors = embedder.embed_batch(&texts).await?;
                if vectors.len() != texts.len() {
                    return Err(Error::Upstream {
                        service: embedder.model_id().to_string(),
                        message: format!("returned {} embeddings for {} texts", vectors.len(), texts.len()),
                        transient: false,
                    });
                }
                if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
                    return Err(Error::DimensionMismatch { expected: dim, actual: bad.len() });
                }
                Ok((i * batch_size, vectors))
            }
        });

        let mut done: Vec<(usize, Vec<Vec<f32>>)> = stream::iter(jobs)
            .buffer_unordered(self.options.concurrency.max(1))
            .inspect_ok(|(offset, vectors)| {
                pb.inc(vectors.len() as u64);
                debug!(offset, batch = vectors.len(), "Embedded batch");
            })
            .try_collect()
            .await?;
        pb.finish_and_clear();

        done.sort_by_key(|(offset, _)| *offset);
        Ok(done.into_iter().flat_map(|(_, vectors)| vectors).collect())
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message("embedding");
        pb
    }
}
