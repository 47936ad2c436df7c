// Chat DTOs for the public API

use serde::{Deserialize, Serialize};
use solace_core::{Analysis, ProgressSnapshot, StressPrompt};
use utoipa::ToSchema;

/// Request to post a message into a session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostMessageRequest {
    /// Free-text message body; must be non-empty after trimming.
    #[schema(example = "I've been feeling a bit better this week")]
    pub message: String,
}

/// Operator-facing diagnostics returned alongside the reply
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
pub struct ResponseMetadata {
    /// Short projection of the analysis for normal cycles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressSnapshot>,
    /// Failure detail when a fallback reply was substituted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_error: Option<String>,
}

/// Result of one processed message.
///
/// Normal cycles carry `analysis`; stress-short-circuited cycles carry
/// `stress_prompt` instead and the reply is a calming-activity suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostMessageResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_prompt: Option<StressPrompt>,
    #[serde(default)]
    pub metadata: ResponseMetadata,
}
