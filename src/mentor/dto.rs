use serde::{Deserialize, Serialize};

fn default_language() -> String {
    "english".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MentorRequest {
    pub message: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub student_id: String,
    #[serde(default)]
    pub emotion: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MentorResponse {
    pub text_response: String,
    pub audio_response: Option<String>,
    pub suggestions: Vec<String>,
}
