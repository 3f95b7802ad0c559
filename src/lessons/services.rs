use std::collections::HashMap;

use crate::data::{DataStore, LessonRecord};
use crate::error::AppError;

use super::dto::LessonContent;

const FALLBACK_LANGUAGE: &str = "english";

/// `map[language]`, else `map["english"]`. Empty strings count as missing.
fn localized<'a>(map: &'a HashMap<String, String>, language: &str) -> Option<&'a str> {
    let pick = |key: &str| map.get(key).map(String::as_str).filter(|s| !s.is_empty());
    pick(language).or_else(|| pick(FALLBACK_LANGUAGE))
}

/// First record matching (region, class_level, subject), shaped for `language`.
pub fn resolve_lesson(
    records: &[LessonRecord],
    region: &str,
    class_level: u32,
    subject: &str,
    language: &str,
) -> Option<LessonContent> {
    let lesson = records
        .iter()
        .find(|r| r.region == region && r.class_level == class_level && r.subject == subject)?;

    Some(LessonContent {
        title: lesson
            .title
            .clone()
            .unwrap_or_else(|| format!("{} for Class {}", subject, class_level)),
        description: lesson
            .description
            .clone()
            .unwrap_or_else(|| "Learn with VidyAI++".into()),
        content: localized(&lesson.content, language)
            .unwrap_or("Lesson content not available")
            .to_string(),
        video_url: localized(&lesson.video_url, language)
            .unwrap_or_default()
            .to_string(),
        resources: lesson.resources.clone(),
    })
}

pub async fn get_lesson(
    store: &DataStore,
    region: &str,
    class_level: u32,
    subject: &str,
    language: &str,
) -> Result<LessonContent, AppError> {
    let records = store.lessons().await?;
    resolve_lesson(&records, region, class_level, subject, language)
        .ok_or_else(|| AppError::NotFound("Lesson not found".into()))
}
