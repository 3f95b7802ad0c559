use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error, warn};

use crate::llm::TextGenerator;

use super::dto::{MentorRequest, MentorResponse};

/// Model reply separated into the answer and its follow-up suggestions.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitReply {
    pub answer: String,
    pub suggestions: Vec<String>,
}

pub fn build_prompt(req: &MentorRequest) -> String {
    let emotion_context = req
        .emotion
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|e| format!("The student appears to be {}. Respond with empathy to this emotion.\n", e))
        .unwrap_or_default();

    format!(
        "You are an AI educational mentor for a student.\n\
         {emotion_context}\n\
         The student's message is: \"{message}\"\n\
         \n\
         Provide a helpful, encouraging, and educational response in {language} language.\n\
         Keep your response concise (under 100 words) and appropriate for a school student.\n\
         Also suggest 2-3 follow-up questions the student might want to ask.",
        emotion_context = emotion_context,
        message = req.message,
        language = req.language,
    )
}

fn is_trim_noise(c: char) -> bool {
    c.is_whitespace() || matches!(c, ':' | '*' | '#')
}

/// Splits free text on "follow-up questions" (or, failing that, the last
/// "questions"), then collects bullet or numbered lines from what follows.
/// Without such lines the first three sentences are used.
pub fn split_reply(text: &str) -> SplitReply {
    lazy_static! {
        static ref FOLLOW_UP: Regex = Regex::new(r"(?i)follow-up questions").unwrap();
        static ref QUESTIONS: Regex = Regex::new(r"(?i)questions").unwrap();
        static ref ITEM: Regex = Regex::new(r"^\s*(?:[-*•]\s+|\d+[.)]\s*)(.+)$").unwrap();
        static ref SENTENCE_END: Regex = Regex::new(r"[.!?]").unwrap();
    }

    let (answer, section) = match (FOLLOW_UP.find(text), FOLLOW_UP.find_iter(text).last()) {
        (Some(first), Some(last)) => (&text[..first.start()], &text[last.end()..]),
        _ => match QUESTIONS.find_iter(text).last() {
            Some(last) => (text, &text[last.end()..]),
            None => (text, ""),
        },
    };

    let mut suggestions: Vec<String> = section
        .lines()
        .filter_map(|line| ITEM.captures(line).and_then(|c| c.get(1)))
        .map(|m| m.as_str().trim_matches(is_trim_noise).to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if suggestions.is_empty() {
        suggestions = SENTENCE_END
            .split(section)
            .map(|s| s.trim_matches(is_trim_noise))
            .filter(|s| !s.is_empty())
            .take(3)
            .map(str::to_string)
            .collect();
    }

    SplitReply {
        answer: answer.trim_matches(is_trim_noise).to_string(),
        suggestions,
    }
}

fn is_telugu(language: &str) -> bool {
    language.trim().eq_ignore_ascii_case("telugu")
}

pub fn default_suggestions(language: &str) -> Vec<String> {
    let items: [&str; 3] = if is_telugu(language) {
        [
            "నేను తదుపరి ఏమి నేర్చుకోవాలి?",
            "మీరు దీన్ని మళ్లీ వివరించగలరా?",
            "ఇది నిజ జీవితానికి ఎలా వర్తిస్తుంది?",
        ]
    } else {
        [
            "What should I learn next?",
            "Can you explain this again?",
            "How does this apply to real life?",
        ]
    };
    items.iter().map(|s| s.to_string()).collect()
}

/// Canned reply used when generation is unavailable or unusable.
pub fn mock_reply(language: &str) -> MentorResponse {
    let greeting = if is_telugu(language) {
        "మీ ప్రశ్నకు స్వాగతం! నేను మీకు సహాయం చేయడానికి ఇక్కడ ఉన్నాను. మీరు ఏమి నేర్చుకోవాలనుకుంటున్నారు?"
    } else {
        "Welcome to your question! I'm here to help you learn. What would you like to know more about?"
    };
    MentorResponse {
        text_response: greeting.to_string(),
        audio_response: None,
        suggestions: default_suggestions(language),
    }
}

/// Never fails: generation problems degrade to [`mock_reply`].
pub async fn chat(generator: &dyn TextGenerator, req: &MentorRequest) -> MentorResponse {
    let raw = match generator.generate(&build_prompt(req)).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, student_id = %req.student_id, "mentor generation failed, serving canned reply");
            return mock_reply(&req.language);
        }
    };

    let SplitReply { answer, suggestions } = split_reply(&raw);
    if answer.is_empty() {
        warn!(student_id = %req.student_id, "model reply had no answer text, serving canned reply");
        return mock_reply(&req.language);
    }

    let suggestions = if suggestions.is_empty() {
        debug!("no suggestions extracted, using defaults");
        default_suggestions(&req.language)
    } else {
        suggestions
    };

    MentorResponse {
        text_response: answer,
        audio_response: None,
        suggestions,
    }
}
