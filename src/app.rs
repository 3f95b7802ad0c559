use std::net::SocketAddr;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{auth, emotion, lessons, mentor, quiz, skills, voice};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth::router())
                .merge(quiz::router())
                .merge(mentor::router())
                .merge(emotion::router())
                .merge(voice::router())
                .merge(lessons::router())
                .merge(skills::router())
                .route("/health", get(health)),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms = ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms = ms, "response");
                        }
                    },
                ),
        )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::data::Role;
    use crate::test_support::{bearer_for, fake_state, ScriptedClassifier, ScriptedGenerator};

    async fn app_with(
        generator: ScriptedGenerator,
        classifier: ScriptedClassifier,
    ) -> (TempDir, AppState, Router) {
        let (dir, state) = fake_state(Arc::new(generator), Arc::new(classifier)).await;
        let app = build_app(state.clone());
        (dir, state, app)
    }

    async fn offline_app() -> (TempDir, AppState, Router) {
        app_with(
            ScriptedGenerator::failing("offline"),
            ScriptedClassifier::failing("offline"),
        )
        .await
    }

    async fn body_json(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_as(uri: &str, bearer: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::AUTHORIZATION, bearer)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
        let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(b) = bearer {
            req = req.header(header::AUTHORIZATION, b);
        }
        req.body(Body::from(body.to_string())).unwrap()
    }

    fn login(username: &str, password: &str) -> Request<Body> {
        Request::post("/api/v1/auth/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={}&password={}", username, password)))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (_dir, _state, app) = offline_app().await;
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["status"], "healthy");
    }

    #[tokio::test]
    async fn login_returns_token_and_profile() {
        let (_dir, _state, app) = offline_app().await;
        let res = app.oneshot(login("student1", "password123")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = body_json(res).await;
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["user_role"], "student");
        assert_eq!(body["user_id"], "student1");
        assert_eq!(body["preferred_language"], "telugu");
        assert!(!body["access_token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_password_is_challenged() {
        let (_dir, _state, app) = offline_app().await;
        let res = app.oneshot(login("student1", "nope")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(body_json(res).await["detail"], "Incorrect username or password");
    }

    #[tokio::test]
    async fn token_from_login_opens_me() {
        let (_dir, _state, app) = offline_app().await;
        let res = app.clone().oneshot(login("mentor1", "password123")).await.unwrap();
        let token = body_json(res).await["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        let res = app
            .oneshot(get_as("/api/v1/auth/me", &format!("Bearer {}", token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let me = body_json(res).await;
        assert_eq!(me["username"], "mentor1");
        assert_eq!(me["role"], "mentor");
        assert!(me.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn quiz_requires_token() {
        let (_dir, _state, app) = offline_app().await;
        let req = post_json(
            "/api/v1/gemini-quiz",
            None,
            json!({ "subject": "Math", "topic": "Fractions", "difficulty": "easy" }),
        );
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn quiz_falls_back_when_generation_fails() {
        let (_dir, _state, app) = offline_app().await;
        let req = post_json(
            "/api/v1/gemini-quiz",
            Some(&bearer_for("student2", Role::Student)),
            json!({ "subject": "Math", "topic": "Fractions", "difficulty": "easy" }),
        );
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = body_json(res).await;
        let questions = body["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 2);
        for q in questions {
            let options = q["options"].as_array().unwrap();
            assert_eq!(options.len(), 4);
            assert!(options.contains(&q["correct_answer"]));
        }
    }

    #[tokio::test]
    async fn lesson_falls_back_to_english_content() {
        let (_dir, _state, app) = offline_app().await;
        let res = app
            .oneshot(get_as(
                "/api/v1/lessons/Andhra%20Pradesh/6/Math/marathi",
                &bearer_for("student1", Role::Student),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["title"], "Fractions and Decimals");
        assert!(body["content"].as_str().unwrap().starts_with("# Fractions and Decimals"));
    }

    #[tokio::test]
    async fn unknown_lesson_is_not_found() {
        let (_dir, _state, app) = offline_app().await;
        let res = app
            .oneshot(get_as(
                "/api/v1/lessons/Kerala/6/Math/english",
                &bearer_for("student1", Role::Student),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(res).await["detail"], "Lesson not found");
    }

    #[tokio::test]
    async fn skill_map_access_rules() {
        let (_dir, _state, app) = offline_app().await;
        let student = bearer_for("student1", Role::Student);
        let mentor = bearer_for("mentor1", Role::Mentor);

        let own = app
            .clone()
            .oneshot(get_as("/api/v1/skill-map/student1", &student))
            .await
            .unwrap();
        assert_eq!(own.status(), StatusCode::OK);
        let body = body_json(own).await;
        assert_eq!(body["skill_heatmap"].as_array().unwrap().len(), 5);

        let other = app
            .clone()
            .oneshot(get_as("/api/v1/skill-map/student2", &student))
            .await
            .unwrap();
        assert_eq!(other.status(), StatusCode::FORBIDDEN);

        let by_mentor = app
            .clone()
            .oneshot(get_as("/api/v1/skill-map/student2", &mentor))
            .await
            .unwrap();
        assert_eq!(by_mentor.status(), StatusCode::OK);

        let missing = app
            .oneshot(get_as("/api/v1/skill-map/ghost", &mentor))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    fn face_upload(student_id: &str) -> Request<Body> {
        let boundary = "vidyai-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"student_id\"\r\n\r\n{id}\r\n\
                 --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"face.jpg\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n",
                b = boundary,
                id = student_id
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"\xff\xd8\xff\xe0fakejpeg");
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::post("/api/v1/face-auth")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn face_auth_replies_in_student_language_and_cleans_up() {
        let (_dir, state, app) = app_with(
            ScriptedGenerator::failing("offline"),
            ScriptedClassifier::returning("happy", &[("happy", 91.0), ("sad", 2.5)]),
        )
        .await;

        let res = app.oneshot(face_upload("student1")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["emotion"], "happy");
        assert_eq!(body["confidence"], 91.0);
        assert_eq!(body["all_emotions"]["sad"], 2.5);
        assert!(body["response"].as_str().unwrap().chars().any(|c| !c.is_ascii()));

        let leftovers = std::fs::read_dir(&state.config.upload_dir).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn face_auth_failure_is_internal_and_cleans_up() {
        let (_dir, state, app) = offline_app().await;
        let res = app.oneshot(face_upload("student2")).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body_json(res).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("Error processing image"), "{detail}");

        let leftovers = std::fs::read_dir(&state.config.upload_dir).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn voice_command_needs_no_token() {
        let (_dir, _state, app) = offline_app().await;
        let req = post_json(
            "/api/v1/voice-command",
            None,
            json!({ "audio_data": "AAAA", "language": "english" }),
        );
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["confidence"], 0.85);
        assert_ne!(body["action"], "unknown_command");
    }

    #[tokio::test]
    async fn malformed_json_body_gets_detail() {
        let (_dir, _state, app) = offline_app().await;
        let req = Request::post("/api/v1/voice-command")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(res).await["detail"].is_string());
    }

    #[tokio::test]
    async fn missing_json_field_is_unprocessable_with_detail() {
        let (_dir, _state, app) = offline_app().await;
        let req = post_json(
            "/api/v1/gemini-quiz",
            Some(&bearer_for("student2", Role::Student)),
            json!({ "subject": "Math" }),
        );
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body_json(res).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("topic"), "{detail}");
    }

    #[tokio::test]
    async fn non_numeric_class_level_gets_detail() {
        let (_dir, _state, app) = offline_app().await;
        let res = app
            .oneshot(get_as(
                "/api/v1/lessons/Telangana/six/Math/english",
                &bearer_for("student1", Role::Student),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(res).await["detail"].is_string());
    }

    #[tokio::test]
    async fn login_without_password_field_gets_detail() {
        let (_dir, _state, app) = offline_app().await;
        let req = Request::post("/api/v1/auth/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=student1"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert!(res.status().is_client_error());
        assert!(body_json(res).await["detail"].is_string());
    }

    #[tokio::test]
    async fn mentor_chat_falls_back_with_three_suggestions() {
        let (_dir, _state, app) = offline_app().await;
        let req = post_json(
            "/api/v1/mentor-chat",
            Some(&bearer_for("student1", Role::Student)),
            json!({ "message": "What is a fraction?", "student_id": "student1" }),
        );
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert!(!body["text_response"].as_str().unwrap().is_empty());
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 3);
    }
}
