// Message domain types
//
// Messages form the ordered per-session conversation log. Assistant turns
// carry the analysis produced for that exchange as metadata; user turns
// carry none.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl From<&str> for MessageRole {
    fn from(s: &str) -> Self {
        match s {
            "assistant" => MessageRole::Assistant,
            _ => MessageRole::User,
        }
    }
}

/// Structured emotional/risk summary derived from a single exchange.
///
/// `risk_level` is always present and in 0..=10; the default-on-failure
/// value is 0, never an absence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Analysis {
    pub emotional_state: String,
    pub themes: Vec<String>,
    pub risk_level: u8,
    pub recommended_approach: String,
    pub progress_indicators: Vec<String>,
}

/// Short projection of the analysis, stored alongside the full object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProgressSnapshot {
    pub emotional_state: String,
    pub risk_level: u8,
}

/// Metadata attached to assistant turns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MessageMetadata {
    pub analysis: Analysis,
    pub progress: ProgressSnapshot,
}

impl MessageMetadata {
    pub fn from_analysis(analysis: Analysis) -> Self {
        let progress = ProgressSnapshot {
            emotional_state: analysis.emotional_state.clone(),
            risk_level: analysis.risk_level,
        };
        Self { analysis, progress }
    }
}

/// One turn of a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Message {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
    pub timestamp: DateTime<Utc>,
}

/// Message content accepted by `SessionStore::append`; ids, sequence and
/// timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub role: MessageRole,
    pub content: String,
    pub metadata: Option<MessageMetadata>,
}

impl NewMessage {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            metadata: None,
        }
    }

    /// Create an assistant turn with its analysis metadata
    pub fn assistant(content: impl Into<String>, metadata: MessageMetadata) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            metadata: Some(metadata),
        }
    }
}

/// Last `n` turns of a history slice, oldest first
pub fn recent(history: &[Message], n: usize) -> &[Message] {
    &history[history.len().saturating_sub(n)..]
}
