use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{auth::services::AuthUser, error::AppError, extract::ApiPath, state::AppState};

use super::{dto::LessonContent, services::get_lesson};

pub fn lesson_routes() -> Router<AppState> {
    Router::new().route(
        "/lessons/:region/:class_level/:subject/:language",
        get(fetch_lesson),
    )
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn fetch_lesson(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath((region, class_level, subject, language)): ApiPath<(String, u32, String, String)>,
) -> Result<Json<LessonContent>, AppError> {
    let lesson = get_lesson(&state.store, &region, class_level, &subject, &language).await?;
    info!(%region, class_level, %subject, %language, "lesson served");
    Ok(Json(lesson))
}
