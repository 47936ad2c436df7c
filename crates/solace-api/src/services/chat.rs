// Chat service: maps pipeline outcomes to the public API contracts

use std::sync::Arc;

use solace_contracts::{
    Message, PostMessageResponse, ProgressSnapshot, ResponseMetadata, Session,
};
use solace_core::{ChatPipeline, ProcessedMessage, Result, SessionStore};
use uuid::Uuid;

pub struct ChatService {
    store: Arc<dyn SessionStore>,
    pipeline: ChatPipeline,
}

impl ChatService {
    pub fn new(store: Arc<dyn SessionStore>, pipeline: ChatPipeline) -> Self {
        Self { store, pipeline }
    }

    pub async fn create_session(&self, owner_id: Uuid) -> Result<Session> {
        self.store.create(owner_id).await
    }

    pub async fn list_sessions(&self, owner_id: Uuid) -> Result<Vec<Session>> {
        self.store.list_by_owner(owner_id).await
    }

    pub async fn get_session(&self, session_id: Uuid, owner_id: Uuid) -> Result<Option<Session>> {
        self.store.get(session_id, owner_id).await
    }

    pub async fn complete_session(
        &self,
        session_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Session>> {
        self.store.complete(session_id, owner_id).await
    }

    pub async fn history(
        &self,
        session_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Vec<Message>>> {
        self.store.history(session_id, owner_id).await
    }

    pub async fn post_message(
        &self,
        session_id: Uuid,
        owner_id: Uuid,
        text: &str,
    ) -> Result<PostMessageResponse> {
        let outcome = self
            .pipeline
            .process_message(session_id, owner_id, text)
            .await?;

        Ok(match outcome {
            ProcessedMessage::Replied {
                reply,
                analysis,
                model_error,
            } => PostMessageResponse {
                reply,
                metadata: ResponseMetadata {
                    progress: Some(ProgressSnapshot {
                        emotional_state: analysis.emotional_state.clone(),
                        risk_level: analysis.risk_level,
                    }),
                    debug_error: model_error,
                },
                analysis: Some(analysis),
                stress_prompt: None,
            },
            ProcessedMessage::ShortCircuited { reply, prompt } => PostMessageResponse {
                reply,
                analysis: None,
                stress_prompt: Some(prompt),
                metadata: ResponseMetadata::default(),
            },
        })
    }
}
