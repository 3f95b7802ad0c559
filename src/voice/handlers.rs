use axum::{routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{extract::ApiJson, state::AppState};

use super::{
    dto::{VoiceCommandRequest, VoiceCommandResponse},
    services::recognize,
};

pub fn voice_routes() -> Router<AppState> {
    Router::new().route("/voice-command", post(voice_command))
}

#[instrument(skip_all, fields(language = %body.language))]
pub async fn voice_command(ApiJson(body): ApiJson<VoiceCommandRequest>) -> Json<VoiceCommandResponse> {
    let res = recognize(&body.language);
    info!(action = %res.action, "voice command recognized");
    Json(res)
}
