use serde::{Deserialize, Serialize};

fn default_language() -> String {
    "english".into()
}

#[derive(Debug, Deserialize)]
pub struct VoiceCommandRequest {
    /// Base64 audio clip. Recognition is simulated, so the payload is not decoded.
    #[allow(dead_code)]
    pub audio_data: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct VoiceCommandResponse {
    pub command: String,
    pub confidence: f64,
    pub action: String,
}
