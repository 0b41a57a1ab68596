//! Briefing generation: the grounding prompt, reply clean-up and the hosted
//! model clients.

use std::sync::Arc;

use corridor_core::config::{GenerationBackend, GenerationSettings};
use corridor_core::error::{Error, Result};
use corridor_core::traits::GenerationClient;
use corridor_core::upstream::UpstreamPolicy;

pub mod gemini;
pub mod ollama;
pub mod output;
pub mod prompt;

pub use gemini::GeminiClient;
pub use ollama::OllamaGenerator;
pub use output::strip_wrapper;
pub use prompt::{assemble, FALLBACK_SENTENCE};

/// Construct the client selected by `generation.provider`.
pub fn build_generator(settings: &GenerationSettings, policy: UpstreamPolicy) -> Result<Arc<dyn GenerationClient>> {
    match settings.provider {
        GenerationBackend::Gemini => {
            let key = settings.api_key.clone().ok_or_else(|| {
                Error::InvalidConfig("generation.api_key is not set (or export GOOGLE_API_KEY)".to_string())
            })?;
            Ok(Arc::new(GeminiClient::new(&settings.base_url, &settings.model, key, policy)))
        }
        GenerationBackend::Ollama => Ok(Arc::new(OllamaGenerator::new(&settings.base_url, &settings.model, policy))),
    }
}
