// Core traits for pluggable backends
//
// These traits let the chat pipeline run against different backends:
// - In-memory implementations for tests and development
// - Database implementations for production
// - A real language-model driver or a scripted fake

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::message::{Message, NewMessage};
use crate::session::Session;

// ============================================================================
// SessionStore - owner-scoped session persistence
// ============================================================================

/// Owner-scoped session persistence.
///
/// Every read and write is keyed by `(session_id, owner_id)`; a session is
/// never visible to anyone but its owner. `append` must apply all messages
/// of one call atomically and bump the session's `updated_at`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a new active session for `owner_id`
    async fn create(&self, owner_id: Uuid) -> Result<Session>;

    /// Fetch a session summary; None if it does not exist for this owner
    async fn get(&self, session_id: Uuid, owner_id: Uuid) -> Result<Option<Session>>;

    /// Sessions for one owner, most recently updated first; ties broken by
    /// insertion order.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Session>>;

    /// Ordered message log; None if the session does not exist for this owner
    async fn history(&self, session_id: Uuid, owner_id: Uuid) -> Result<Option<Vec<Message>>>;

    /// Append messages to the session log atomically, in the given order,
    /// and update `updated_at`.
    async fn append(
        &self,
        session_id: Uuid,
        owner_id: Uuid,
        messages: Vec<NewMessage>,
    ) -> Result<()>;

    /// Explicit lifecycle action: active -> completed
    async fn complete(&self, session_id: Uuid, owner_id: Uuid) -> Result<Option<Session>>;
}

// ============================================================================
// LanguageModel - generative backend for the analysis/response stages
// ============================================================================

/// Options for a single generation call
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<i32>,
}

/// A generative-language backend.
///
/// The pipeline only ever needs plain text back; prior turns are passed
/// separately so a driver can supply them in its backend's native
/// conversation format.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        history: &[Message],
        options: &GenerateOptions,
    ) -> Result<String>;
}

// ============================================================================
// EventNotifier - best-effort processing events
// ============================================================================

/// Event emitted after each processed message
#[derive(Debug, Clone, Serialize)]
pub struct MessageProcessedEvent {
    pub session_id: Uuid,
    pub owner_id: Uuid,
    /// Absent for stress-short-circuited cycles, which skip the analysis stage
    pub risk_level: Option<u8>,
    pub short_circuited: bool,
}

impl MessageProcessedEvent {
    /// Event name on the wire
    pub const NAME: &'static str = "session.message";

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Best-effort processing-event sink.
///
/// At-most-once, no ordering guarantee. The pipeline fires notifications
/// without waiting on them; failures are logged and swallowed, never
/// surfaced to the caller.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    async fn notify(&self, event: MessageProcessedEvent) -> Result<()>;
}

/// No-op notifier for tests and deployments without an event pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl EventNotifier for NoopNotifier {
    async fn notify(&self, _event: MessageProcessedEvent) -> Result<()> {
        Ok(())
    }
}
