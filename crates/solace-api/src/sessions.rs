// Session and message HTTP routes
//
// All routes are owner-scoped through the AuthOwner extractor; a session
// is only ever visible to the user who created it.

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use solace_contracts::{
    ListResponse, Message, PostMessageRequest, PostMessageResponse, Session,
};
use solace_core::ChatError;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{AuthOwner, JwtVerifier};
use crate::services::ChatService;

/// App state for session routes
#[derive(Clone, FromRef)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub verifier: JwtVerifier,
}

/// Create session routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/sessions", post(create_session).get(list_sessions))
        .route("/v1/sessions/:session_id", get(get_session))
        .route("/v1/sessions/:session_id/complete", post(complete_session))
        .route("/v1/sessions/:session_id/history", get(get_history))
        .route("/v1/sessions/:session_id/messages", post(post_message))
        .with_state(state)
}

/// Map pipeline errors to response codes; anything unexpected is logged
/// and collapsed to a generic processing failure.
fn into_status(e: ChatError) -> StatusCode {
    match e {
        ChatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ChatError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        ChatError::Unauthenticated => StatusCode::UNAUTHORIZED,
        other => {
            tracing::error!("request failed: {}", other);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// POST /v1/sessions - Create a new session for the authenticated owner
#[utoipa::path(
    post,
    path = "/v1/sessions",
    responses(
        (status = 201, description = "Session created successfully", body = Session),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "sessions"
)]
pub async fn create_session(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
) -> Result<(StatusCode, Json<Session>), StatusCode> {
    let session = state
        .chat
        .create_session(owner_id)
        .await
        .map_err(into_status)?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /v1/sessions - List the owner's sessions, most recently updated first
#[utoipa::path(
    get,
    path = "/v1/sessions",
    responses(
        (status = 200, description = "List of sessions", body = ListResponse<Session>),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "sessions"
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
) -> Result<Json<ListResponse<Session>>, StatusCode> {
    let sessions = state
        .chat
        .list_sessions(owner_id)
        .await
        .map_err(into_status)?;

    Ok(Json(ListResponse::new(sessions)))
}

/// GET /v1/sessions/{session_id} - Get one session summary
#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session found", body = Session),
        (status = 404, description = "Session not found for this owner"),
        (status = 500, description = "Internal server error")
    ),
    tag = "sessions"
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    AuthOwner(owner_id): AuthOwner,
) -> Result<Json<Session>, StatusCode> {
    let session = state
        .chat
        .get_session(session_id, owner_id)
        .await
        .map_err(into_status)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(session))
}

/// POST /v1/sessions/{session_id}/complete - Mark a session completed
#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/complete",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session completed", body = Session),
        (status = 404, description = "Session not found for this owner"),
        (status = 500, description = "Internal server error")
    ),
    tag = "sessions"
)]
pub async fn complete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    AuthOwner(owner_id): AuthOwner,
) -> Result<Json<Session>, StatusCode> {
    let session = state
        .chat
        .complete_session(session_id, owner_id)
        .await
        .map_err(into_status)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(session))
}

/// GET /v1/sessions/{session_id}/history - Ordered message log
#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}/history",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Ordered messages", body = ListResponse<Message>),
        (status = 404, description = "Session not found for this owner"),
        (status = 500, description = "Internal server error")
    ),
    tag = "sessions"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    AuthOwner(owner_id): AuthOwner,
) -> Result<Json<ListResponse<Message>>, StatusCode> {
    let messages = state
        .chat
        .history(session_id, owner_id)
        .await
        .map_err(into_status)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(ListResponse::new(messages)))
}

/// POST /v1/sessions/{session_id}/messages - Process one message
///
/// Always answers 200 with a coherent reply under model outage; only auth,
/// not-found and invalid-input conditions produce an error response.
#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/messages",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    request_body = PostMessageRequest,
    responses(
        (status = 200, description = "Message processed", body = PostMessageResponse),
        (status = 400, description = "Empty message"),
        (status = 404, description = "Session not found for this owner"),
        (status = 500, description = "Internal server error")
    ),
    tag = "messages"
)]
pub async fn post_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    AuthOwner(owner_id): AuthOwner,
    Json(req): Json<PostMessageRequest>,
) -> Result<Json<PostMessageResponse>, StatusCode> {
    let response = state
        .chat
        .post_message(session_id, owner_id, &req.message)
        .await
        .map_err(into_status)?;

    Ok(Json(response))
}

// ============================================
// Tests
// ============================================
