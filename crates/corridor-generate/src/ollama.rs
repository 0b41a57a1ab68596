//! Ollama `/api/generate` client for locally hosted models.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use corridor_core::error::{Error, Result};
use corridor_core::traits::GenerationClient;
use corridor_core::types::Availability;
use corridor_core::upstream::UpstreamPolicy;

const SERVICE: &str = "ollama";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
    policy: UpstreamPolicy,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, model: &str, policy: UpstreamPolicy) -> Self {
        Self { client: Client::new(), base_url: base_url.trim_end_matches('/').to_string(), model: model.to_string(), policy }
    }

    async fn request(&self, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest { model: &self.model, prompt, stream: false, options: GenerateOptions { temperature } };
        let response = self.client.post(&url).json(&body).send().await.map_err(|e| Error::transport(SERVICE, &e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::from_status(SERVICE, status.as_u16(), &text));
        }
        let parsed: GenerateResponse = response.json().await.map_err(|e| Error::parse("Ollama response", e))?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl GenerationClient for OllamaGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        info!(model = %self.model, prompt_chars = prompt.len(), "Generating briefing");
        self.policy.call(SERVICE, || self.request(prompt, temperature)).await
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
