// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Session models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Message models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sequence: i32,
    pub role: String,
    pub content: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Message content for insertion; id, sequence and created_at are
/// assigned by the database.
#[derive(Debug, Clone)]
pub struct NewMessageRow {
    pub role: String,
    pub content: String,
    pub metadata: Option<serde_json::Value>,
}

// ============================================
// Mood models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct MoodRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub score: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateMood {
    pub owner_id: Uuid,
    pub score: i32,
    pub note: Option<String>,
}
