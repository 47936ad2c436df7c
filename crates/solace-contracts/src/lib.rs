// Public API contracts for Solace
//
// Request/response DTOs for the HTTP surface. Domain entities are defined
// in solace-core and re-exported here so route handlers and clients share
// one set of shapes.

pub mod chat;
pub mod common;
pub mod mood;

pub use chat::{PostMessageRequest, PostMessageResponse, ResponseMetadata};
pub use common::ListResponse;
pub use mood::{CreateMoodRequest, MoodEntry};

// Re-export domain entities as API shapes
pub use solace_core::{
    ActivityKind, Analysis, CalmingActivity, Message, MessageMetadata, MessageRole,
    ProgressSnapshot, Session, SessionStatus, StressPrompt,
};
