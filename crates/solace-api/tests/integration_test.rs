// Integration tests for the Solace API
// Run with: cargo test --test integration_test -- --ignored
//
// Requires a running server on localhost:8080 that shares this process's
// JWT_SECRET (tokens are minted here the way the external issuer would).

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::json;
use solace_contracts::{ListResponse, Message, PostMessageResponse, Session};
use uuid::Uuid;

const API_BASE_URL: &str = "http://localhost:8080";

#[derive(Serialize)]
struct Claims {
    sub: String,
    exp: usize,
}

fn bearer_token(owner_id: Uuid) -> String {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must match the running server");
    let claims = Claims {
        sub: owner_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to mint token")
}

#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_full_session_flow() {
    let client = reqwest::Client::new();
    let owner_id = Uuid::now_v7();
    let token = bearer_token(owner_id);

    // Step 1: Health check
    let health = client
        .get(format!("{}/health", API_BASE_URL))
        .send()
        .await
        .expect("Failed to reach server");
    assert_eq!(health.status(), 200);

    // Step 2: Create a session
    let response = client
        .post(format!("{}/v1/sessions", API_BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to create session");
    assert_eq!(response.status(), 201);
    let session: Session = response.json().await.expect("Failed to parse session");

    // Step 3: Post a message
    let response = client
        .post(format!(
            "{}/v1/sessions/{}/messages",
            API_BASE_URL, session.id
        ))
        .bearer_auth(&token)
        .json(&json!({"message": "Hello, I wanted to check in today"}))
        .send()
        .await
        .expect("Failed to post message");
    assert_eq!(response.status(), 200);
    let reply: PostMessageResponse = response.json().await.expect("Failed to parse reply");
    assert!(!reply.reply.is_empty());
    if let Some(analysis) = &reply.analysis {
        assert!(analysis.risk_level <= 10);
    }

    // Step 4: History shows the appended turns
    let response = client
        .get(format!(
            "{}/v1/sessions/{}/history",
            API_BASE_URL, session.id
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to fetch history");
    assert_eq!(response.status(), 200);
    let history: ListResponse<Message> = response.json().await.expect("Failed to parse history");
    assert!(!history.data.is_empty());

    // Step 5: Session list has the session first
    let response = client
        .get(format!("{}/v1/sessions", API_BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to list sessions");
    let sessions: ListResponse<Session> = response.json().await.expect("Failed to parse sessions");
    assert_eq!(sessions.data[0].id, session.id);

    // Step 6: Record a mood entry
    let response = client
        .post(format!("{}/v1/moods", API_BASE_URL))
        .bearer_auth(&token)
        .json(&json!({"score": 64, "note": "integration check"}))
        .send()
        .await
        .expect("Failed to record mood");
    assert_eq!(response.status(), 201);
}
