//! Embeddings served by an Ollama daemon (`POST /api/embeddings`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use corridor_core::error::{Error, Result};
use corridor_core::traits::EmbeddingProvider;
use corridor_core::types::Availability;
use corridor_core::upstream::UpstreamPolicy;

const SERVICE: &str = "ollama-embeddings";

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dim: usize,
    policy: UpstreamPolicy,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str, dim: usize, policy: UpstreamPolicy) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dim,
            policy,
        }
    }

    async fn request(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest { model: &self.model, prompt: text })
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(SERVICE, status.as_u16(), &body));
        }

        let parsed: EmbedResponse = response.json().await.map_err(|e| Error::parse("embedding response", e))?;
        Ok(parsed.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.policy.call(SERVICE, || self.request(text)).await?;
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: vector.len() });
        }
        debug!(model = %self.model, chars = text.len(), "Embedded text");
        Ok(vector)
    }

    async fn health_check(&self) -> Availability {
        let url = format!("{}/api/tags", self.base_url);
        let request = self.client.get(&url).send();
        match tokio::time::timeout(self.policy.timeout, request).await {
            Ok(Ok(response)) if response.status().is_success() => Availability::Available,
            Ok(Ok(response)) => Availability::Unavailable(format!("HTTP {}", response.status())),
            Ok(Err(e)) => Availability::Unavailable(e.to_string()),
            Err(_) => Availability::Unavailable(format!("no response within {:?}", self.policy.timeout)),
        }
    }
}
