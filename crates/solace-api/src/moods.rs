// Mood-entry HTTP routes
//
// Thin plumbing: validate, store, return. Independent of the chat
// pipeline.

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use solace_contracts::{CreateMoodRequest, ListResponse, MoodEntry};
use std::sync::Arc;

use crate::auth::{AuthOwner, JwtVerifier};
use crate::services::MoodStore;

/// App state for mood routes
#[derive(Clone, FromRef)]
pub struct AppState {
    pub moods: Arc<dyn MoodStore>,
    pub verifier: JwtVerifier,
}

/// Create mood routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/moods", post(create_mood).get(list_moods))
        .with_state(state)
}

/// POST /v1/moods - Record a mood entry
#[utoipa::path(
    post,
    path = "/v1/moods",
    request_body = CreateMoodRequest,
    responses(
        (status = 201, description = "Mood recorded", body = MoodEntry),
        (status = 400, description = "Score outside 0..=100"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "moods"
)]
pub async fn create_mood(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
    Json(req): Json<CreateMoodRequest>,
) -> Result<(StatusCode, Json<MoodEntry>), StatusCode> {
    if !(0..=100).contains(&req.score) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let entry = state
        .moods
        .create(owner_id, req.score, req.note)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record mood: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /v1/moods - List the owner's mood entries, most recent first
#[utoipa::path(
    get,
    path = "/v1/moods",
    responses(
        (status = 200, description = "List of mood entries", body = ListResponse<MoodEntry>),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "moods"
)]
pub async fn list_moods(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
) -> Result<Json<ListResponse<MoodEntry>>, StatusCode> {
    let entries = state.moods.list(owner_id).await.map_err(|e| {
        tracing::error!("Failed to list moods: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ListResponse::new(entries)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::token_for;
    use crate::services::InMemoryMoodStore;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    fn test_app() -> Router {
        routes(AppState {
            moods: Arc::new(InMemoryMoodStore::new()),
            verifier: JwtVerifier::new(SECRET),
        })
    }

    fn post_mood(token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/v1/moods");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_mood_requires_auth() {
        let app = test_app();
        let response = app
            .oneshot(post_mood(None, r#"{"score": 50}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_mood_score_is_validated() {
        let app = test_app();
        let token = token_for(Uuid::now_v7(), SECRET, 3600);

        let response = app
            .clone()
            .oneshot(post_mood(Some(&token), r#"{"score": 101}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_mood(Some(&token), r#"{"score": -1}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_mood_round_trip() {
        let app = test_app();
        let token = token_for(Uuid::now_v7(), SECRET, 3600);

        let response = app
            .clone()
            .oneshot(post_mood(
                Some(&token),
                r#"{"score": 72, "note": "better today"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/v1/moods")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["data"][0]["score"], 72);
        assert_eq!(json["data"][0]["note"], "better today");
    }
}
