//! Gemini `generateContent` client (Generative Language API, API-key auth).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use corridor_core::config::Secret;
use corridor_core::error::{Error, Result};
use corridor_core::traits::GenerationClient;
use corridor_core::types::Availability;
use corridor_core::upstream::UpstreamPolicy;

const SERVICE: &str = "gemini";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Secret,
    policy: UpstreamPolicy,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: Secret, policy: UpstreamPolicy) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            policy,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn request(&self, prompt: &str, temperature: f32) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content { role: "user", parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig { temperature },
        };
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, &e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::from_status(SERVICE, status.as_u16(), &text));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| Error::parse("Gemini response", e))?;
        extract_text(parsed)
    }
}

fn extract_text(parsed: GenerateResponse) -> Result<String> {
    let Some(candidate) = parsed.candidates.into_iter().next() else {
        let reason = parsed.prompt_feedback.map_or_else(|| "no candidates".to_string(), |f| f.to_string());
        return Err(Error::Upstream { service: SERVICE.to_string(), message: format!("empty response: {reason}"), transient: false });
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(Error::Upstream { service: SERVICE.to_string(), message: format!("no text returned (finishReason {reason})"), transient: false });
    }
    Ok(text)
}

#[async_trait]
impl GenerationClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        info!(model = %self.model, prompt_chars = prompt.len(), "Generating briefing");
        let text = self.policy.call(SERVICE, || self.request(prompt, temperature)).await?;
        debug!(chars = text.len(), "Generation complete");
        Ok(text)
    }

    async fn health_check(&self) -> Availability {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let request = self.client.get(&url).header("x-goog-api-key", self.api_key.expose()).send();
        match tokio::time::timeout(self.policy.timeout, request).await {
            Ok(Ok(response)) if response.status().is_success() => Availability::Available,
            Ok(Ok(response)) => Availability::Unavailable(format!("HTTP {}", response.status())),
            Ok(Err(e)) => Availability::Unavailable(e.to_string()),
            Err(_) => Availability::Unavailable(format!("no response within {:?}", self.policy.timeout)),
        }
    }
}
