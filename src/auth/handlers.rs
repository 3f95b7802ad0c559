use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{PublicUser, TokenForm, TokenResponse},
        services::{authenticate, AuthUser, JwtKeys},
    },
    error::AppError,
    extract::ApiForm,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/token", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<TokenForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = authenticate(&state.store, form.username.trim(), &form.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(&user)?;

    info!(user_id = %user.id, role = user.role.as_str(), "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        user_role: user.role,
        user_id: user.id,
        name: user.name,
        region: user.region,
        class_level: user.class_level,
        preferred_language: user.preferred_language,
    }))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}
