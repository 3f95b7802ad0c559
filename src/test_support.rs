//! Shared fixtures for unit and router tests.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use lazy_static::lazy_static;
use serde_json::json;
use tempfile::TempDir;

use crate::auth::services::{hash_password, JwtKeys};
use crate::config::{AppConfig, GeminiConfig, JwtConfig};
use crate::data::{
    sample_syllabus, DataStore, Role, User, MENTORS_FILE, STUDENTS_FILE, SYLLABUS_FILE,
};
use crate::llm::TextGenerator;
use crate::state::AppState;
use crate::vision::{EmotionAnalysis, EmotionClassifier};

lazy_static! {
    // argon2 is slow in debug builds; hash the shared fixture password once
    static ref PASSWORD_HASH: String = hash_password("password123").expect("hash fixture password");
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".into(),
        issuer: "test-issuer".into(),
        audience: "test-aud".into(),
        ttl_minutes: 60,
    }
}

pub fn sample_user(id: &str, role: Role) -> User {
    User {
        id: id.into(),
        username: id.into(),
        password_hash: "unused".into(),
        name: format!("{} name", id),
        role,
        region: "Andhra Pradesh".into(),
        class_level: matches!(role, Role::Student).then_some(6),
        preferred_language: "english".into(),
        disabled: false,
    }
}

fn write_json(dir: &Path, file: &str, value: &serde_json::Value) {
    std::fs::write(dir.join(file), serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

/// Directory with student1 (telugu), student2 (english), a disabled student
/// and mentor1, all using "password123", plus the sample syllabus.
pub async fn fixture_store() -> (TempDir, DataStore) {
    let dir = tempfile::tempdir().unwrap();
    let hash = PASSWORD_HASH.as_str();
    write_json(
        dir.path(),
        STUDENTS_FILE,
        &json!([
            { "id": "student1", "username": "student1", "password_hash": hash, "name": "Ravi Kumar",
              "role": "student", "region": "Andhra Pradesh", "class_level": 6, "preferred_language": "telugu" },
            { "id": "student2", "username": "student2", "password_hash": hash, "name": "Priya Sharma",
              "role": "student", "region": "Telangana", "class_level": 8, "preferred_language": "english" },
            { "id": "student9", "username": "dropout", "password_hash": hash, "name": "Gone",
              "role": "student", "region": "Telangana", "disabled": true }
        ]),
    );
    write_json(
        dir.path(),
        MENTORS_FILE,
        &json!([
            { "id": "mentor1", "username": "mentor1", "password_hash": hash, "name": "Anand Rao",
              "role": "mentor", "region": "Andhra Pradesh" }
        ]),
    );
    write_json(dir.path(), SYLLABUS_FILE, &sample_syllabus());
    let store = DataStore::new(dir.path());
    (dir, store)
}

/// Generator that returns a fixed reply (or error) and records prompts.
pub struct ScriptedGenerator {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            reply: Err(msg.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

/// Classifier that records which paths it saw and whether they existed.
pub struct ScriptedClassifier {
    result: Result<EmotionAnalysis, String>,
    pub seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl ScriptedClassifier {
    pub fn returning(dominant: &str, scores: &[(&str, f64)]) -> Self {
        Self {
            result: Ok(EmotionAnalysis {
                dominant: dominant.into(),
                scores: scores.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            }),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            result: Err(msg.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen_paths(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmotionClassifier for ScriptedClassifier {
    async fn classify(&self, image: &Path) -> anyhow::Result<EmotionAnalysis> {
        self.seen
            .lock()
            .unwrap()
            .push((image.to_path_buf(), image.exists()));
        self.result.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

/// Full state over a fixture directory; the upload dir lives inside it.
pub async fn fake_state(
    generator: Arc<dyn TextGenerator>,
    classifier: Arc<dyn EmotionClassifier>,
) -> (TempDir, AppState) {
    let (dir, store) = fixture_store().await;
    let upload_dir = dir.path().join("uploads");
    std::fs::create_dir_all(&upload_dir).unwrap();
    let config = Arc::new(AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        data_dir: dir.path().to_path_buf(),
        upload_dir,
        jwt: jwt_config(),
        gemini: GeminiConfig {
            api_key: None,
            model: "test-model".into(),
            base_url: "http://localhost".into(),
            timeout_secs: 1,
        },
        vision_url: None,
    });
    let state = AppState::from_parts(config, store, generator, classifier);
    (dir, state)
}

/// Signed bearer token for a directory user.
pub fn bearer_for(username: &str, role: Role) -> String {
    let keys = JwtKeys::from_config(&jwt_config());
    let token = keys.sign(&sample_user(username, role)).unwrap();
    format!("Bearer {}", token)
}
