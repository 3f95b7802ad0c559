use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Arc,
};

use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::auth::services::hash_password;

pub const STUDENTS_FILE: &str = "students.json";
pub const MENTORS_FILE: &str = "mentors.json";
pub const SYLLABUS_FILE: &str = "syllabus_map.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Mentor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Mentor => "mentor",
        }
    }
}

fn default_language() -> String {
    "english".into()
}

/// User record as stored in the directory files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String, // argon2 PHC string
    pub name: String,
    pub role: Role,
    pub region: String,
    #[serde(default)]
    pub class_level: Option<u32>,
    #[serde(default = "default_language")]
    pub preferred_language: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

/// Syllabus entry keyed by (region, class_level, subject).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonRecord {
    pub region: String,
    pub class_level: u32,
    pub subject: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: HashMap<String, String>,
    #[serde(default)]
    pub video_url: HashMap<String, String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Flat-file directory of users and lessons. Every lookup re-reads the files.
#[derive(Clone)]
pub struct DataStore {
    dir: Arc<PathBuf>,
}

impl DataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Arc::new(dir.into()),
        }
    }

    async fn load<T: DeserializeOwned>(&self, file: &str) -> anyhow::Result<Vec<T>> {
        let path = self.dir.join(file);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "data file missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        serde_json::from_slice(&raw).with_context(|| format!("parse {}", path.display()))
    }

    pub async fn students(&self) -> anyhow::Result<Vec<User>> {
        self.load(STUDENTS_FILE).await
    }

    /// Students first, then mentors.
    pub async fn users(&self) -> anyhow::Result<Vec<User>> {
        let mut users = self.students().await?;
        users.extend(self.load::<User>(MENTORS_FILE).await?);
        Ok(users)
    }

    pub async fn lessons(&self) -> anyhow::Result<Vec<LessonRecord>> {
        self.load(SYLLABUS_FILE).await
    }

    async fn write_if_missing<T: Serialize>(&self, file: &str, rows: &T) -> anyhow::Result<bool> {
        let path = self.dir.join(file);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(false);
        }
        let body = serde_json::to_vec_pretty(rows).context("serialize sample data")?;
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(true)
    }

    /// Creates the demo directory files that do not exist yet.
    pub async fn seed_sample_data(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(self.dir.as_path())
            .await
            .with_context(|| format!("create data dir {}", self.dir.display()))?;

        if !tokio::fs::try_exists(self.dir.join(STUDENTS_FILE)).await.unwrap_or(false) {
            let hash = hash_password("password123")?;
            let students = vec![
                User {
                    id: "student1".into(),
                    username: "student1".into(),
                    password_hash: hash.clone(),
                    name: "Ravi Kumar".into(),
                    role: Role::Student,
                    region: "Andhra Pradesh".into(),
                    class_level: Some(6),
                    preferred_language: "telugu".into(),
                    disabled: false,
                },
                User {
                    id: "student2".into(),
                    username: "student2".into(),
                    password_hash: hash,
                    name: "Priya Sharma".into(),
                    role: Role::Student,
                    region: "Telangana".into(),
                    class_level: Some(8),
                    preferred_language: "english".into(),
                    disabled: false,
                },
            ];
            self.write_if_missing(STUDENTS_FILE, &students).await?;
        }

        if !tokio::fs::try_exists(self.dir.join(MENTORS_FILE)).await.unwrap_or(false) {
            let hash = hash_password("mentor123")?;
            let mentors = vec![
                User {
                    id: "mentor1".into(),
                    username: "mentor1".into(),
                    password_hash: hash.clone(),
                    name: "Anand Rao".into(),
                    role: Role::Mentor,
                    region: "Andhra Pradesh".into(),
                    class_level: None,
                    preferred_language: "english".into(),
                    disabled: false,
                },
                User {
                    id: "mentor2".into(),
                    username: "mentor2".into(),
                    password_hash: hash,
                    name: "Lakshmi Devi".into(),
                    role: Role::Mentor,
                    region: "Telangana".into(),
                    class_level: None,
                    preferred_language: "english".into(),
                    disabled: false,
                },
            ];
            self.write_if_missing(MENTORS_FILE, &mentors).await?;
        }

        self.write_if_missing(SYLLABUS_FILE, &sample_syllabus()).await?;

        info!(dir = %self.dir.display(), "sample data ready");
        Ok(())
    }
}

impl User {
    pub async fn find_by_username(store: &DataStore, username: &str) -> anyhow::Result<Option<User>> {
        Ok(store.users().await?.into_iter().find(|u| u.username == username))
    }

    pub async fn find_student(store: &DataStore, id: &str) -> anyhow::Result<Option<User>> {
        Ok(store.students().await?.into_iter().find(|u| u.id == id))
    }
}

pub(crate) fn sample_syllabus() -> serde_json::Value {
    json!([
        {
            "region": "Andhra Pradesh",
            "class_level": 6,
            "subject": "Math",
            "title": "Fractions and Decimals",
            "description": "Learn about fractions, decimals, and their operations",
            "content": {
                "english": "# Fractions and Decimals\n\nFractions represent parts of a whole. For example, in the fraction 3/4, the number on top (3) is called the numerator, and the number at the bottom (4) is called the denominator.\n\n## Adding Fractions\n\nTo add fractions with the same denominator, add the numerators and keep the denominator the same.\n\nExample: 1/5 + 2/5 = 3/5",
                "telugu": "# భిన్నాలు మరియు దశాంశాలు\n\nభిన్నాలు మొత్తంలో భాగాలను సూచిస్తాయి. ఉదాహరణకు, 3/4 భిన్నంలో, పైన ఉన్న సంఖ్య (3) న్యూమరేటర్ అని పిలుస్తారు, మరియు దిగువన ఉన్న సంఖ్య (4) డినామినేటర్ అని పిలుస్తారు.\n\n## భిన్నాలను కలపడం\n\nఒకే డినామినేటర్‌తో భిన్నాలను కలపడానికి, న్యూమరేటర్‌లను కలపండి మరియు డినామినేటర్‌ను అలాగే ఉంచండి.\n\nఉదాహరణ: 1/5 + 2/5 = 3/5",
                "hindi": "# भिन्न और दशमलव\n\nभिन्न एक पूर्ण के हिस्सों का प्रतिनिधित्व करते हैं। उदाहरण के लिए, भिन्न 3/4 में, ऊपर की संख्या (3) को अंश कहा जाता है, और नीचे की संख्या (4) को हर कहा जाता है।\n\n## भिन्नों को जोड़ना\n\nसमान हर वाले भिन्नों को जोड़ने के लिए, अंशों को जोड़ें और हर को वही रखें।\n\nउदाहरण: 1/5 + 2/5 = 3/5"
            },
            "video_url": {
                "english": "/lessons/AP/6/Math/english/fractions.mp4",
                "telugu": "/lessons/AP/6/Math/telugu/fractions.mp4",
                "hindi": "/lessons/AP/6/Math/hindi/fractions.mp4"
            },
            "resources": [
                { "title": "Fraction Worksheet", "url": "/resources/AP/6/Math/fraction_worksheet.pdf" }
            ]
        },
        {
            "region": "Telangana",
            "class_level": 8,
            "subject": "Science",
            "title": "Solar System",
            "description": "Learn about planets, stars, and other celestial bodies",
            "content": {
                "english": "# The Solar System\n\nThe Solar System consists of the Sun and everything that orbits around it, including planets, moons, asteroids, and comets.\n\n## Planets\n\nThere are eight planets in our Solar System: Mercury, Venus, Earth, Mars, Jupiter, Saturn, Uranus, and Neptune.",
                "telugu": "# సౌర వ్యవస్థ\n\nసౌర వ్యవస్థలో సూర్యుడు మరియు దాని చుట్టూ తిరిగే ప్రతిదీ ఉంటుంది, అందులో గ్రహాలు, చంద్రులు, గ్రహశకలాలు మరియు తోకచుక్కలు ఉన్నాయి.\n\n## గ్రహాలు\n\nమన సౌర వ్యవస్థలో ఎనిమిది గ్రహాలు ఉన్నాయి: బుధుడు, శుక్రుడు, భూమి, అంగారకుడు, గురుడు, శని, యురేనస్ మరియు నెప్ట్యూన్.",
                "hindi": "# सौर मंडल\n\nसौर मंडल में सूरज और उसके चारों ओर परिक्रमा करने वाली हर चीज शामिल है, जिसमें ग्रह, चंद्रमा, क्षुद्रग्रह और धूमकेतु शामिल हैं।\n\n## ग्रह\n\nहमारे सौर मंडल में आठ ग्रह हैं: बुध, शुक्र, पृथ्वी, मंगल, बृहस्पति, शनि, यूरेनस और नेपच्यून।"
            },
            "video_url": {
                "english": "/lessons/TS/8/Science/english/solar_system.mp4",
                "telugu": "/lessons/TS/8/Science/telugu/solar_system.mp4",
                "hindi": "/lessons/TS/8/Science/hindi/solar_system.mp4"
            },
            "resources": [
                { "title": "Planet Chart", "url": "/resources/TS/8/Science/planet_chart.pdf" }
            ]
        }
    ])
}
