//! Text-generation capability.
//!
//! Handlers only see [`TextGenerator`]; the production implementation talks to
//! the Gemini `generateContent` REST endpoint.

use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GeminiConfig;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the model's free-text answer to a single prompt.
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Stand-in used when no API key is configured. Every call fails, which sends
/// callers down their canned-response path.
pub struct Unavailable;

#[async_trait]
impl TextGenerator for Unavailable {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        bail!("text generation is not configured")
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: &str, base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        );
        Ok(Self {
            http,
            endpoint,
            api_key,
        })
    }
}

/// Picks the real client when a key is present, [`Unavailable`] otherwise.
pub fn from_config(cfg: &GeminiConfig) -> anyhow::Result<Arc<dyn TextGenerator>> {
    match &cfg.api_key {
        Some(key) => {
            let client = GeminiClient::new(
                key.clone(),
                &cfg.model,
                &cfg.base_url,
                Duration::from_secs(cfg.timeout_secs),
            )?;
            Ok(Arc::new(client))
        }
        None => {
            warn!("GEMINI_API_KEY not set; quiz and mentor endpoints will serve canned responses");
            Ok(Arc::new(Unavailable))
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Concatenated text parts of the first candidate.
fn first_candidate_text(resp: GenerateResponse) -> anyhow::Result<String> {
    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        bail!("model returned no text");
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };
        let resp = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("call generateContent")?
            .error_for_status()
            .context("generateContent status")?
            .json::<GenerateResponse>()
            .await
            .context("decode generateContent response")?;

        let text = first_candidate_text(resp)?;
        debug!(chars = text.len(), "generation completed");
        Ok(text)
    }
}
