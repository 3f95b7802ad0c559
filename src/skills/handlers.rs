use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{auth::services::AuthUser, error::AppError, extract::ApiPath, state::AppState};

use super::{dto::SkillMapResponse, services::skill_map};

pub fn skill_routes() -> Router<AppState> {
    Router::new().route("/skill-map/:student_id", get(get_skill_map))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_skill_map(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(student_id): ApiPath<String>,
) -> Result<Json<SkillMapResponse>, AppError> {
    Ok(Json(skill_map(&state.store, &user, &student_id).await?))
}
