use std::path::{Path, PathBuf};

use anyhow::Context;
use bytes::Bytes;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::dto::FaceAnalysis;
use crate::data::User;
use crate::error::AppError;
use crate::state::AppState;

pub struct UploadItem<'a> {
    pub body: Bytes,
    pub content_type: &'a str,
    pub file_name: Option<&'a str>,
}

/// Canned replies per emotion, in english, telugu, hindi order.
static RESPONSES: [(&str, [&str; 3]); 9] = [
    ("sad", [
        "I notice you seem sad. Can I help you with something?",
        "మీరు బాధగా ఉన్నట్లు కనిపిస్తోంది. నేను మీకు ఏదైనా సహాయం చేయగలనా?",
        "मुझे लगता है कि आप उदास हैं। क्या मैं आपकी कुछ मदद कर सकता हूँ?",
    ]),
    ("angry", [
        "I see you're frustrated. Let's take a break or try a different approach.",
        "మీరు నిరాశగా ఉన్నారు. విరామం తీసుకుందాం లేదా వేరే విధానాన్ని ప్రయత్నిద్దాం.",
        "मैं देख रहा हूं कि आप निराश हैं। चलिए एक ब्रेक लेते हैं या एक अलग दृष्टिकोण से प्रयास करते हैं।",
    ]),
    ("fear", [
        "Don't worry, learning new things can be challenging. I'm here to help.",
        "చింతించకండి, కొత్త విషయాలు నేర్చుకోవడం కష్టంగా ఉండవచ్చు. నేను మీకు సహాయం చేయడానికి ఇక్కడ ఉన్నాను.",
        "चिंता मत करो, नई चीजें सीखना चुनौतीपूर्ण हो सकता है। मैं आपकी मदद के लिए यहां हूं।",
    ]),
    ("disgust", [
        "Let's find something more interesting for you to learn.",
        "మీరు నేర్చుకోవడానికి మరింత ఆసక్తికరమైన దాన్ని కనుగొందాం.",
        "चलिए आपके लिए सीखने के लिए कुछ और दिलचस्प खोजते हैं।",
    ]),
    ("happy", [
        "I'm glad to see you're enjoying the lesson!",
        "మీరు పాఠాన్ని ఆస్వాదిస్తున్నారని చూసి నేను సంతోషిస్తున్నాను!",
        "मुझे खुशी है कि आप पाठ का आनंद ले रहे हैं!",
    ]),
    ("surprise", [
        "That's interesting! Would you like to learn more about this topic?",
        "అది ఆసక్తికరంగా ఉంది! మీరు ఈ అంశం గురించి మరింత తెలుసుకోవాలనుకుంటున్నారా?",
        "यह दिलचस्प है! क्या आप इस विषय के बारे में अधिक जानना चाहेंगे?",
    ]),
    ("neutral", [
        "How are you finding the lesson so far?",
        "మీరు ఇప్పటివరకు పాఠాన్ని ఎలా కనుగొంటున్నారు?",
        "आपको अब तक का पाठ कैसा लग रहा है?",
    ]),
    ("tired", [
        "You seem tired. Would you like to take a short break?",
        "మీరు అలసిపోయినట్లు కనిపిస్తున్నారు. మీరు చిన్న విరామం తీసుకోవాలనుకుంటున్నారా?",
        "आप थके हुए लगते हैं। क्या आप एक छोटा ब्रेक लेना चाहेंगे?",
    ]),
    ("confused", [
        "You seem confused. Let me explain this in a different way.",
        "మీరు గందరగోళంగా ఉన్నట్లు కనిపిస్తున్నారు. నేను దీన్ని వేరే విధంగా వివరిస్తాను.",
        "आप भ्रमित लगते हैं। मुझे इसे एक अलग तरीके से समझाने दें।",
    ]),
];

const NEUTRAL: usize = 6;

/// Unknown emotions read as "neutral", unknown languages as "english".
pub fn emotion_response(emotion: &str, language: &str) -> &'static str {
    let emotion = emotion.trim().to_lowercase();
    let (_, replies) = RESPONSES
        .iter()
        .find(|(name, _)| *name == emotion)
        .unwrap_or(&RESPONSES[NEUTRAL]);
    let idx = match language.trim().to_lowercase().as_str() {
        "telugu" => 1,
        "hindi" => 2,
        _ => 0,
    };
    replies[idx]
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

fn ext_from_name(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    (!ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}

/// Upload spooled to disk for the classifier; removed when dropped.
struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    async fn write(dir: &Path, item: &UploadItem<'_>) -> anyhow::Result<Self> {
        let ext = ext_from_mime(item.content_type)
            .map(str::to_string)
            .or_else(|| item.file_name.and_then(ext_from_name))
            .unwrap_or_else(|| "bin".into());
        // guard exists before the write so a partial file is removed too
        let guard = Self {
            path: dir.join(format!("face-{}.{}", Uuid::new_v4(), ext)),
        };
        tokio::fs::write(&guard.path, &item.body)
            .await
            .with_context(|| format!("write {}", guard.path.display()))?;
        debug!(path = %guard.path.display(), bytes = item.body.len(), "upload spooled");
        Ok(guard)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        // Drop cannot await; a single blocking unlink on the worker is acceptable.
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "upload removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, path = %self.path.display(), "failed to remove upload"),
        }
    }
}

pub async fn analyze_face(
    st: &AppState,
    student_id: &str,
    upload: UploadItem<'_>,
) -> Result<FaceAnalysis, AppError> {
    if upload.body.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    let analysis = {
        let spooled = TempUpload::write(&st.config.upload_dir, &upload)
            .await
            .map_err(processing_error)?;
        st.classifier
            .classify(spooled.path())
            .await
            .map_err(processing_error)?
    };

    let language = User::find_student(&st.store, student_id)
        .await
        .map_err(processing_error)?
        .map(|s| s.preferred_language)
        .unwrap_or_else(|| "english".into());

    let confidence = analysis
        .scores
        .get(&analysis.dominant)
        .copied()
        .unwrap_or(0.0);
    let response = emotion_response(&analysis.dominant, &language).to_string();

    info!(%student_id, emotion = %analysis.dominant, confidence, %language, "face analysed");
    Ok(FaceAnalysis {
        emotion: analysis.dominant,
        confidence,
        response,
        all_emotions: analysis.scores,
    })
}

fn processing_error(e: anyhow::Error) -> AppError {
    error!(error = %e, "error processing image");
    AppError::Internal(format!("Error processing image: {:#}", e))
}
