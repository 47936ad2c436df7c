// Core chat-pipeline abstractions for Solace
// Decision: Keep the pipeline DB-agnostic via traits (SessionStore, LanguageModel, EventNotifier)
// Decision: One pipeline; model-backend selection lives behind the LanguageModel trait, not parallel code paths

pub mod analyze;
pub mod error;
pub mod memory;
pub mod message;
pub mod pipeline;
pub mod respond;
pub mod session;
pub mod stress;
pub mod traits;

pub use analyze::default_analysis;
pub use error::{ChatError, Result};
pub use memory::InMemorySessionStore;
pub use message::{Analysis, Message, MessageMetadata, MessageRole, NewMessage, ProgressSnapshot};
pub use pipeline::{ChatPipeline, ProcessedMessage, DEFAULT_CALL_TIMEOUT};
pub use respond::FALLBACK_REPLY;
pub use session::{Session, SessionStatus};
pub use stress::{detect, ActivityKind, CalmingActivity, StressPrompt, STRESS_KEYWORDS};
pub use traits::{
    EventNotifier, GenerateOptions, LanguageModel, MessageProcessedEvent, NoopNotifier,
    SessionStore,
};
