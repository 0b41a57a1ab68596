//! Process-wide wiring: clients are built once from `Settings` and handed to
//! each orchestrator explicitly.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use corridor_core::config::Settings;
use corridor_core::error::Result;
use corridor_core::loader;
use corridor_core::traits::{EmbeddingProvider, GenerationClient, VectorIndex};
use corridor_core::types::Availability;
use corridor_embed::build_embedder;
use corridor_generate::build_generator;
use corridor_vector::LanceIndex;

use crate::answer::QueryOrchestrator;
use crate::ingest::{IngestOptions, IngestionReport, Ingestor};
use crate::retriever::Retriever;
use crate::verify::{verify, VerifyReport};

pub struct Pipeline {
    settings: Settings,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub index: Availability,
    pub embedder: Availability,
    pub generator: Availability,
}

impl HealthReport {
    pub fn all_available(&self) -> bool {
        self.index.is_available() && self.embedder.is_available() && self.generator.is_available()
    }
}

impl Pipeline {
    /// Embedder and LanceDB index from configuration. The generator is built
    /// on demand since indexing does not need credentials.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let embedder = build_embedder(&settings.embedding, settings.upstream.policy())?;
        let index: Arc<dyn VectorIndex> = Arc::new(LanceIndex::open(settings.index_dir()));
        info!(index = %settings.index_dir().display(), collection = %settings.data.collection, "Pipeline ready");
        Ok(Self { settings, embedder, index })
    }

    pub fn with_components(settings: Settings, embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { settings, embedder, index }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    pub fn ingestor(&self, show_progress: bool) -> Ingestor {
        let options = IngestOptions {
            chunking: self.settings.chunking.to_config(),
            batch_size: self.settings.embedding.batch_size,
            concurrency: self.settings.embedding.concurrency,
            show_progress,
        };
        Ingestor::new(Arc::clone(&self.embedder), Arc::clone(&self.index), options)
    }

    pub fn retriever(&self, collection: &str) -> Retriever {
        Retriever::new(Arc::clone(&self.embedder), Arc::clone(&self.index), collection)
    }

    pub fn generator(&self) -> Result<Arc<dyn GenerationClient>> {
        build_generator(&self.settings.generation, self.settings.upstream.policy())
    }

    pub fn query_orchestrator(&self, collection: &str, generator: Arc<dyn GenerationClient>) -> QueryOrchestrator {
        QueryOrchestrator::new(
            self.retriever(collection),
            generator,
            self.settings.retrieval.top_k,
            self.settings.generation.temperature,
        )
    }

    /// Load every supported file under `corpus` and rebuild `collection`.
    pub async fn index_corpus(&self, corpus: &Path, collection: &str, show_progress: bool) -> Result<IngestionReport> {
        let documents = loader::load(corpus)?;
        self.ingestor(show_progress).ingest(&documents, collection).await
    }

    pub async fn verify(&self, collection: &str) -> Result<VerifyReport> {
        verify(self.index.as_ref(), &self.retriever(collection)).await
    }

    pub async fn health(&self) -> HealthReport {
        let generator = match self.generator() {
            Ok(client) => client.health_check().await,
            Err(e) => Availability::Unavailable(e.to_string()),
        };
        HealthReport { index: self.index.health_check().await, embedder: self.embedder.health_check().await, generator }
    }
}
