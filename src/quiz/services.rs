use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error, warn};

use crate::llm::TextGenerator;

use super::dto::{AudioPrompts, QuizQuestion, QuizRequest, QuizResponse};

pub fn build_prompt(req: &QuizRequest) -> String {
    format!(
        "Create a quiz for class {class} students on the topic of {topic} in {subject}.\n\
         The quiz should be appropriate for students in {region} and be at a {difficulty} difficulty level.\n\
         \n\
         Format the response as a JSON array with 5 questions. Each element must be an object with exactly these keys:\n\
         \"question\": the question text,\n\
         \"options\": an array of four answer options (A, B, C, D),\n\
         \"correct_answer\": the text of the correct option,\n\
         \"explanation\": a brief explanation of why that is the correct answer.\n\
         \n\
         The response should be in {language} language.",
        class = req.class_level,
        topic = req.topic,
        subject = req.subject,
        region = req.regional_context.as_deref().unwrap_or("India"),
        difficulty = req.difficulty,
        language = req.language,
    )
}

lazy_static! {
    static ref FENCED: Regex = Regex::new(r"(?s)```(?:json|JSON)[ \t]*\r?\n(.*?)\r?\n?[ \t]*```").unwrap();
    static ref ARRAY: Regex = Regex::new(r"(?s)\[\s*\{.*\}\s*\]").unwrap();
}

/// Places in a free-text answer that may hold the JSON array, best first:
/// each ```json fenced block, then a bracketed array of objects, then everything.
pub fn json_candidates(text: &str) -> Vec<&str> {
    let mut out: Vec<&str> = FENCED
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    if let Some(array) = ARRAY.find(text) {
        out.push(array.as_str());
    }
    out.push(text);
    out
}

/// Most likely candidate from [`json_candidates`].
pub fn extract_json_candidate(text: &str) -> &str {
    json_candidates(text).first().copied().unwrap_or(text)
}

/// Strict parse of model output. Candidates are tried in order; `None` when
/// none is a non-empty question array.
pub fn parse_questions(text: &str) -> Option<Vec<QuizQuestion>> {
    for candidate in json_candidates(text) {
        match serde_json::from_str::<Vec<QuizQuestion>>(candidate.trim()) {
            Ok(qs) if !qs.is_empty() => return Some(qs),
            Ok(_) => debug!("candidate is an empty question list"),
            Err(e) => debug!(error = %e, "candidate is not a question array"),
        }
    }
    warn!("model output holds no usable question array");
    None
}

pub fn audio_prompts(req: &QuizRequest) -> AudioPrompts {
    AudioPrompts {
        intro: format!("Welcome to your {} quiz on {}", req.subject, req.topic),
        correct: "That's correct! Well done!".into(),
        incorrect: "That's not quite right. Let's try again.".into(),
    }
}

fn question(text: String, options: [&str; 4], correct: usize, explanation: &str) -> QuizQuestion {
    QuizQuestion {
        question: text,
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: options[correct].to_string(),
        explanation: explanation.to_string(),
    }
}

/// Fixed two-question quiz served whenever generation is not usable.
pub fn mock_quiz(req: &QuizRequest) -> QuizResponse {
    let questions = if req.language.eq_ignore_ascii_case("telugu") {
        let opts = ["ఎంపిక A", "ఎంపిక B", "ఎంపిక C", "ఎంపిక D"];
        let why = "ఇది సరైన సమాధానం ఎందుకంటే...";
        vec![
            question(format!("{} గురించి ప్రశ్న 1?", req.topic), opts, 1, why),
            question(format!("{} గురించి ప్రశ్న 2?", req.topic), opts, 0, why),
        ]
    } else {
        let opts = ["Option A", "Option B", "Option C", "Option D"];
        let why = "This is the correct answer because...";
        vec![
            question(format!("Question 1 about {}?", req.topic), opts, 1, why),
            question(format!("Question 2 about {}?", req.topic), opts, 0, why),
        ]
    };
    QuizResponse {
        questions,
        audio_prompts: Some(audio_prompts(req)),
    }
}

/// Never fails: any generation or parse problem yields [`mock_quiz`].
pub async fn generate_quiz(generator: &dyn TextGenerator, req: &QuizRequest) -> QuizResponse {
    let raw = match generator.generate(&build_prompt(req)).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "quiz generation failed, serving mock quiz");
            return mock_quiz(req);
        }
    };

    match parse_questions(&raw) {
        Some(questions) => {
            debug!(count = questions.len(), "quiz generated");
            QuizResponse {
                questions,
                audio_prompts: Some(audio_prompts(req)),
            }
        }
        None => {
            error!(response = %raw, "failed to parse quiz from model response, serving mock quiz");
            mock_quiz(req)
        }
    }
}
