use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{auth::services::AuthUser, extract::ApiJson, state::AppState};

use super::{
    dto::{MentorRequest, MentorResponse},
    services::chat,
};

pub fn mentor_routes() -> Router<AppState> {
    Router::new().route("/mentor-chat", post(chat_with_mentor))
}

#[instrument(skip_all, fields(user_id = %user.id, student_id = %body.student_id))]
pub async fn chat_with_mentor(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<MentorRequest>,
) -> Json<MentorResponse> {
    let reply = chat(state.generator.as_ref(), &body).await;
    info!(suggestions = reply.suggestions.len(), "mentor replied");
    Json(reply)
}
