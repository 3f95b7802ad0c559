//! Facial-emotion classification capability, backed by a DeepFace-compatible
//! HTTP service.

use std::{collections::BTreeMap, path::Path, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// Dominant label plus the full score distribution, as reported by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionAnalysis {
    pub dominant: String,
    pub scores: BTreeMap<String, f64>,
}

#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, image: &Path) -> anyhow::Result<EmotionAnalysis>;
}

pub struct Unconfigured;

#[async_trait]
impl EmotionClassifier for Unconfigured {
    async fn classify(&self, _image: &Path) -> anyhow::Result<EmotionAnalysis> {
        bail!("emotion classifier is not configured")
    }
}

#[derive(Clone)]
pub struct DeepFaceClient {
    http: reqwest::Client,
    analyze_url: String,
}

impl DeepFaceClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            analyze_url: format!("{}/analyze", base_url.trim_end_matches('/')),
        })
    }
}

pub fn from_config(vision_url: Option<&str>, timeout: Duration) -> anyhow::Result<Arc<dyn EmotionClassifier>> {
    match vision_url {
        Some(url) => Ok(Arc::new(DeepFaceClient::new(url, timeout)?)),
        None => {
            warn!("VISION_URL not set; face analysis requests will fail");
            Ok(Arc::new(Unconfigured))
        }
    }
}

fn mime_from_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    results: Vec<FaceResult>,
}

#[derive(Debug, Deserialize)]
struct FaceResult {
    dominant_emotion: String,
    #[serde(default)]
    emotion: BTreeMap<String, f64>,
}

/// First detected face wins.
fn first_face(resp: AnalyzeResponse) -> anyhow::Result<EmotionAnalysis> {
    let Some(face) = resp.results.into_iter().next() else {
        bail!("no face detected");
    };
    Ok(EmotionAnalysis {
        dominant: face.dominant_emotion,
        scores: face.emotion,
    })
}

#[async_trait]
impl EmotionClassifier for DeepFaceClient {
    async fn classify(&self, image: &Path) -> anyhow::Result<EmotionAnalysis> {
        let raw = tokio::fs::read(image)
            .await
            .with_context(|| format!("read {}", image.display()))?;
        let data_uri = format!(
            "data:{};base64,{}",
            mime_from_path(image),
            Base64::encode_string(&raw)
        );

        let resp = self
            .http
            .post(&self.analyze_url)
            .json(&json!({ "img": data_uri, "actions": ["emotion"] }))
            .send()
            .await
            .context("call vision analyze")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("vision service returned {}: {}", status, body);
        }

        let parsed = resp
            .json::<AnalyzeResponse>()
            .await
            .context("decode vision response")?;
        let analysis = first_face(parsed)?;
        debug!(emotion = %analysis.dominant, "face classified");
        Ok(analysis)
    }
}
