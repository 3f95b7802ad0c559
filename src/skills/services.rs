use rand::Rng;
use tracing::debug;

use crate::auth::policy::{self, Action};
use crate::data::{DataStore, User};
use crate::error::AppError;

use super::dto::{SkillMapResponse, SkillScore, SubjectSkills};

const SUBJECTS: [&str; 5] = ["Math", "Science", "Language", "History", "Geography"];
const SKILLS: [&str; 5] = ["Understanding", "Application", "Analysis", "Creation", "Evaluation"];

/// Scores are placeholders until real performance data exists: uniform in [30, 100).
pub fn build_heatmap<R: Rng>(rng: &mut R) -> Vec<SubjectSkills> {
    SUBJECTS
        .iter()
        .map(|&subject| SubjectSkills {
            subject,
            skills: SKILLS
                .iter()
                .map(|&skill| SkillScore {
                    skill,
                    score: rng.gen_range(30..100),
                })
                .collect(),
        })
        .collect()
}

pub async fn skill_map(
    store: &DataStore,
    requester: &User,
    student_id: &str,
) -> Result<SkillMapResponse, AppError> {
    policy::require(requester, student_id, Action::ReadStudentData)?;

    let student = User::find_student(store, student_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))?;
    debug!(student = %student.id, "building skill map");

    Ok(SkillMapResponse {
        student_id: student.id,
        student_name: student.name,
        class_level: student.class_level,
        skill_heatmap: build_heatmap(&mut rand::thread_rng()),
    })
}
