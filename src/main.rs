mod app;
mod auth;
mod config;
mod data;
mod emotion;
mod error;
mod extract;
mod lessons;
mod llm;
mod mentor;
mod quiz;
mod skills;
mod state;
mod vision;
mod voice;

#[cfg(test)]
mod test_support;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "vidyai=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;
    let config = state.config.clone();
    tracing::info!(
        data_dir = %config.data_dir.display(),
        upload_dir = %config.upload_dir.display(),
        "starting VidyAI++ backend"
    );

    app::serve(app::build_app(state), &config).await
}
