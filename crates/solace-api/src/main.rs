// Solace API server
// Decision: Store selection by configuration (Postgres when DATABASE_URL is set, in-memory otherwise)
// Decision: Model misconfiguration fails at startup; transient model failures degrade per request

mod auth;
mod moods;
mod notify;
mod services;
mod sessions;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use solace_contracts::*;
use solace_core::{
    ChatPipeline, EventNotifier, InMemorySessionStore, LanguageModel, NoopNotifier, SessionStore,
};
use solace_gemini::GeminiClient;
use solace_storage::{Database, PgSessionStore};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::services::{ChatService, InMemoryMoodStore, MoodStore};

/// State for the health endpoint
#[derive(Clone)]
struct HealthState {
    store_mode: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    store_mode: String,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store_mode: state.store_mode.clone(),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        sessions::create_session,
        sessions::list_sessions,
        sessions::get_session,
        sessions::complete_session,
        sessions::get_history,
        sessions::post_message,
        moods::create_mood,
        moods::list_moods,
    ),
    components(
        schemas(
            Session, SessionStatus,
            Message, MessageRole, MessageMetadata,
            Analysis, ProgressSnapshot,
            StressPrompt, CalmingActivity, ActivityKind,
            PostMessageRequest, PostMessageResponse, ResponseMetadata,
            CreateMoodRequest, MoodEntry,
            ListResponse<Session>,
            ListResponse<Message>,
            ListResponse<MoodEntry>,
        )
    ),
    tags(
        (name = "sessions", description = "Session lifecycle endpoints"),
        (name = "messages", description = "Message processing endpoints"),
        (name = "moods", description = "Mood-entry endpoints")
    ),
    info(
        title = "Solace API",
        version = "0.2.0",
        description = "API for supportive chat sessions with per-message emotional analysis",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solace_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    tracing::info!("solace-api starting...");

    // Identity gate configuration; token issuance lives outside this service
    let jwt_secret =
        std::env::var("JWT_SECRET").context("JWT_SECRET environment variable required")?;
    let verifier = auth::JwtVerifier::new(&jwt_secret);

    // Language model: a missing key is fatal here, transient call failures
    // degrade per request inside the pipeline
    let model: Arc<dyn LanguageModel> =
        Arc::new(GeminiClient::from_env().context("language model not configured")?);

    // Store selection: Postgres when configured, in-memory otherwise
    let store: Arc<dyn SessionStore>;
    let mood_store: Arc<dyn MoodStore>;
    let store_mode;
    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let db = Database::from_url(&url)
                .await
                .context("Failed to connect to database")?;
            db.migrate()
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Connected to database");
            store = Arc::new(PgSessionStore::new(db.clone()));
            mood_store = Arc::new(db);
            store_mode = "postgres";
        }
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set, using in-memory stores (state is lost on restart)"
            );
            store = Arc::new(InMemorySessionStore::new());
            mood_store = Arc::new(InMemoryMoodStore::new());
            store_mode = "memory";
        }
    }

    // Event notifier (optional - gracefully degrade to no-op if not configured)
    let notifier: Arc<dyn EventNotifier> = match std::env::var("EVENT_WEBHOOK_URL") {
        Ok(url) if !url.is_empty() => {
            tracing::info!(url = %url, "Event webhook configured");
            Arc::new(notify::WebhookNotifier::new(url))
        }
        _ => {
            tracing::info!("EVENT_WEBHOOK_URL not set, processing events are dropped");
            Arc::new(NoopNotifier)
        }
    };

    let mut pipeline = ChatPipeline::new(store.clone(), model, notifier);
    if let Some(secs) = std::env::var("MODEL_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
    {
        tracing::info!(timeout_secs = secs, "Model call timeout configured");
        pipeline = pipeline.with_call_timeout(Duration::from_secs(secs));
    }

    // Create module-specific states
    let sessions_state = sessions::AppState {
        chat: Arc::new(ChatService::new(store, pipeline)),
        verifier: verifier.clone(),
    };
    let moods_state = moods::AppState {
        moods: mood_store,
        verifier,
    };
    let health_state = HealthState {
        store_mode: store_mode.to_string(),
    };

    // Load API prefix from environment (default: empty)
    // Example: API_PREFIX="/api" results in routes like /api/v1/sessions
    let api_prefix = std::env::var("API_PREFIX").unwrap_or_default();
    if !api_prefix.is_empty() {
        tracing::info!(prefix = %api_prefix, "API prefix configured");
    }

    // Load CORS allowed origins from environment (optional)
    // Only needed when the UI is served from a different origin than the API
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    // Build API routes
    let api_routes = Router::new()
        .merge(sessions::routes(sessions_state))
        .merge(moods::routes(moods_state));

    // Build main router with health (not prefixed) and prefixed API routes
    let mut app = Router::new().route("/health", get(health).with_state(health_state));
    app = app.merge(build_router_with_prefix(api_routes, &api_prefix));

    // Add Swagger UI
    let app =
        app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                ])
                .allow_credentials(true),
        )
    } else {
        app
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Build router with optional API prefix (extracted for testing)
fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_routes() -> Router {
        Router::new().route("/v1/test", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn test_api_prefix_empty() {
        let app = build_router_with_prefix(test_routes(), "");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_api_prefix_set() {
        let app = build_router_with_prefix(test_routes(), "/api");

        // Route should work with prefix
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);

        // Route should NOT work without prefix
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
    }
}
