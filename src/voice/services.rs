use rand::seq::SliceRandom;

use super::dto::VoiceCommandResponse;

const CONFIDENCE: f64 = 0.85;

const ENGLISH: [&str; 4] = ["go to dashboard", "take quiz", "show video", "ask mentor"];
const TELUGU: [&str; 4] = [
    "డాష్‌బోర్డ్‌కి వెళ్ళండి",
    "క్విజ్ తీసుకోండి",
    "వీడియో చూపించు",
    "మెంటార్‌ని అడగండి",
];
const HINDI: [&str; 4] = [
    "डैशबोर्ड पर जाएं",
    "क्विज़ लें",
    "वीडियो दिखाएं",
    "मेंटर से पूछें",
];

// Same position in each list means the same action.
const ACTIONS: [&str; 4] = ["navigate_to_dashboard", "start_quiz", "play_video", "open_mentor"];

fn commands_for(language: &str) -> &'static [&'static str; 4] {
    match language.to_lowercase().as_str() {
        "telugu" => &TELUGU,
        "hindi" => &HINDI,
        _ => &ENGLISH,
    }
}

pub fn action_for(command: &str) -> &'static str {
    [&ENGLISH, &TELUGU, &HINDI]
        .iter()
        .find_map(|list| list.iter().position(|c| *c == command))
        .map(|i| ACTIONS[i])
        .unwrap_or("unknown_command")
}

/// Simulated recognition: picks one of the known phrases for `language`.
pub fn recognize(language: &str) -> VoiceCommandResponse {
    let commands = commands_for(language);
    let command = commands
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(commands[0]);

    VoiceCommandResponse {
        command: command.to_string(),
        confidence: CONFIDENCE,
        action: action_for(command).to_string(),
    }
}
