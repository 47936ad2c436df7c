// Database-backed SessionStore implementation
//
// Implements the core SessionStore trait over the Postgres repositories,
// mapping rows to domain types at the boundary.

use async_trait::async_trait;
use solace_core::{
    ChatError, Message, MessageMetadata, MessageRole, NewMessage, Result, Session, SessionStatus,
    SessionStore,
};
use uuid::Uuid;

use crate::models::{MessageRow, NewMessageRow, SessionRow};
use crate::repositories::Database;

/// Postgres-backed session store
#[derive(Clone)]
pub struct PgSessionStore {
    db: Database,
}

impl PgSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn row_to_session(row: SessionRow) -> Session {
        Session {
            id: row.id,
            owner_id: row.owner_id,
            status: SessionStatus::from(row.status.as_str()),
            started_at: row.started_at,
            updated_at: row.updated_at,
        }
    }

    fn row_to_message(row: MessageRow) -> Message {
        let metadata = row.metadata.and_then(|value| {
            match serde_json::from_value::<MessageMetadata>(value) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    tracing::warn!(message_id = %row.id, error = %e, "dropping unreadable message metadata");
                    None
                }
            }
        });

        Message {
            id: row.id,
            session_id: row.session_id,
            role: MessageRole::from(row.role.as_str()),
            content: row.content,
            metadata,
            timestamp: row.created_at,
        }
    }

    fn to_row(message: NewMessage) -> NewMessageRow {
        NewMessageRow {
            role: message.role.to_string(),
            content: message.content,
            metadata: message
                .metadata
                .and_then(|metadata| serde_json::to_value(metadata).ok()),
        }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, owner_id: Uuid) -> Result<Session> {
        let row = self
            .db
            .create_session(owner_id)
            .await
            .map_err(|e| ChatError::store(e.to_string()))?;
        Ok(Self::row_to_session(row))
    }

    async fn get(&self, session_id: Uuid, owner_id: Uuid) -> Result<Option<Session>> {
        let row = self
            .db
            .get_session(session_id, owner_id)
            .await
            .map_err(|e| ChatError::store(e.to_string()))?;
        Ok(row.map(Self::row_to_session))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Session>> {
        let rows = self
            .db
            .list_sessions(owner_id)
            .await
            .map_err(|e| ChatError::store(e.to_string()))?;
        Ok(rows.into_iter().map(Self::row_to_session).collect())
    }

    async fn history(&self, session_id: Uuid, owner_id: Uuid) -> Result<Option<Vec<Message>>> {
        let session = self
            .db
            .get_session(session_id, owner_id)
            .await
            .map_err(|e| ChatError::store(e.to_string()))?;
        if session.is_none() {
            return Ok(None);
        }

        let rows = self
            .db
            .list_messages(session_id)
            .await
            .map_err(|e| ChatError::store(e.to_string()))?;
        Ok(Some(rows.into_iter().map(Self::row_to_message).collect()))
    }

    async fn append(
        &self,
        session_id: Uuid,
        owner_id: Uuid,
        messages: Vec<NewMessage>,
    ) -> Result<()> {
        let rows = messages.into_iter().map(Self::to_row).collect();
        let appended = self
            .db
            .append_messages(session_id, owner_id, rows)
            .await
            .map_err(|e| ChatError::store(e.to_string()))?;

        if appended {
            Ok(())
        } else {
            Err(ChatError::SessionNotFound(session_id))
        }
    }

    async fn complete(&self, session_id: Uuid, owner_id: Uuid) -> Result<Option<Session>> {
        let row = self
            .db
            .complete_session(session_id, owner_id)
            .await
            .map_err(|e| ChatError::store(e.to_string()))?;
        Ok(row.map(Self::row_to_session))
    }
}
