use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{instrument, warn};

use crate::{error::AppError, state::AppState};

use super::{
    dto::FaceAnalysis,
    services::{analyze_face, UploadItem},
};

pub fn face_routes() -> Router<AppState> {
    Router::new()
        .route("/face-auth", post(face_authentication))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

/// POST /face-auth (multipart)
/// Fields: `file` (image) and `student_id`.
#[instrument(skip(state, mp))]
pub async fn face_authentication(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<FaceAnalysis>, AppError> {
    let mut image: Option<(Bytes, String, Option<String>)> = None;
    let mut student_id: Option<String> = None;

    while let Some(field) = mp.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let file_name = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(bad_multipart)?;
                image = Some((data, content_type, file_name));
            }
            Some("student_id") => {
                student_id = Some(field.text().await.map_err(bad_multipart)?);
            }
            other => warn!(field = ?other, "ignoring unexpected multipart field"),
        }
    }

    let (body, content_type, file_name) =
        image.ok_or_else(|| AppError::BadRequest("file is required".into()))?;
    let student_id = student_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("student_id is required".into()))?;

    let upload = UploadItem {
        body,
        content_type: &content_type,
        file_name: file_name.as_deref(),
    };
    let analysis = analyze_face(&state, &student_id, upload).await?;
    Ok(Json(analysis))
}

fn bad_multipart<E: std::fmt::Display>(e: E) -> AppError {
    AppError::BadRequest(format!("invalid multipart body: {}", e))
}
