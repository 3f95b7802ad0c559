use serde::{Deserialize, Serialize};

fn default_language() -> String {
    "english".into()
}

fn default_class_level() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizRequest {
    pub subject: String,
    pub topic: String,
    pub difficulty: String,
    #[serde(default)]
    pub regional_context: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_class_level")]
    pub class_level: u32,
}

/// One multiple-choice question. Model output must match this shape exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioPrompts {
    pub intro: String,
    pub correct: String,
    pub incorrect: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
    pub audio_prompts: Option<AudioPrompts>,
}
