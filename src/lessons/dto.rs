use serde::Serialize;

use crate::data::Resource;

/// Lesson resolved for one language.
#[derive(Debug, Serialize, PartialEq)]
pub struct LessonContent {
    pub title: String,
    pub description: String,
    pub content: String,
    pub video_url: String,
    pub resources: Vec<Resource>,
}
