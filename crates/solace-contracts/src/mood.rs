// Mood-entry DTOs for the public API
//
// Discrete mood scores recorded per user. Plumbing only; the chat pipeline
// never reads these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request to record a mood entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMoodRequest {
    /// Mood score in 0..=100
    #[schema(example = 72)]
    pub score: i32,
    /// Optional free-text note
    #[serde(default)]
    pub note: Option<String>,
}

/// A recorded mood entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MoodEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub score: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mood_request_minimal() {
        let req: CreateMoodRequest = serde_json::from_str(r#"{"score": 50}"#).unwrap();
        assert_eq!(req.score, 50);
        assert_eq!(req.note, None);
    }

    #[test]
    fn test_create_mood_request_with_note() {
        let req: CreateMoodRequest =
            serde_json::from_str(r#"{"score": 10, "note": "rough day"}"#).unwrap();
        assert_eq!(req.score, 10);
        assert_eq!(req.note, Some("rough day".to_string()));
    }
}
