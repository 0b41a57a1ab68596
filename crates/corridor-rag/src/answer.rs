use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use corridor_core::error::{Error, Result};
use corridor_core::traits::GenerationClient;
use corridor_core::types::{Briefing, RetrievalResult};
use corridor_generate::{assemble, strip_wrapper};

use crate::retriever::Retriever;

/// A briefing together with the fragments it was grounded on.
#[derive(Debug, Clone)]
pub struct Answer {
    pub briefing: Briefing,
    pub sources: RetrievalResult,
}

pub struct QueryOrchestrator {
    retriever: Retriever,
    generator: Arc<dyn GenerationClient>,
    top_k: usize,
    temperature: f32,
}

impl QueryOrchestrator {
    pub fn new(retriever: Retriever, generator: Arc<dyn GenerationClient>, top_k: usize, temperature: f32) -> Self {
        Self { retriever, generator, top_k, temperature }
    }

    pub async fn answer(&self, query: &str) -> Result<Briefing> {
        Ok(self.answer_with_sources(query).await?.briefing)
    }

    /// Retrieval, prompt assembly and generation for one question. An empty
    /// retrieval result is still sent to the model; the prompt carries the
    /// fallback wording.
    pub async fn answer_with_sources(&self, query: &str) -> Result<Answer> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let start = Instant::now();
        let sources = self.retriever.retrieve(query, self.top_k).await?;
        let prompt = assemble(&sources, query);
        let raw = self.generator.generate(&prompt, self.temperature).await?;
        let briefing = Briefing { text: strip_wrapper(&raw) };
        info!(
            collection = self.retriever.collection(),
            fragments = sources.len(),
            model = self.generator.model(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Briefing generated"
        );
        Ok(Answer { briefing, sources })
    }
}
