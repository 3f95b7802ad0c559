use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{auth::services::AuthUser, extract::ApiJson, state::AppState};

use super::{
    dto::{QuizRequest, QuizResponse},
    services::generate_quiz,
};

pub fn quiz_routes() -> Router<AppState> {
    Router::new().route("/gemini-quiz", post(create_quiz))
}

#[instrument(skip_all, fields(user_id = %user.id, subject = %body.subject, language = %body.language))]
pub async fn create_quiz(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<QuizRequest>,
) -> Json<QuizResponse> {
    let quiz = generate_quiz(state.generator.as_ref(), &body).await;
    info!(questions = quiz.questions.len(), "quiz served");
    Json(quiz)
}
