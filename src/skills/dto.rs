use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SkillScore {
    pub skill: &'static str,
    pub score: u32,
}

#[derive(Debug, Serialize)]
pub struct SubjectSkills {
    pub subject: &'static str,
    pub skills: Vec<SkillScore>,
}

#[derive(Debug, Serialize)]
pub struct SkillMapResponse {
    pub student_id: String,
    pub student_name: String,
    pub class_level: Option<u32>,
    pub skill_heatmap: Vec<SubjectSkills>,
}
