// In-memory SessionStore
//
// Backing store for tests and single-process development runs. Production
// deployments use the Postgres-backed store from solace-storage; both sit
// behind the SessionStore trait so the pipeline cannot tell them apart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{ChatError, Result};
use crate::message::{Message, NewMessage};
use crate::session::{Session, SessionStatus};
use crate::traits::SessionStore;

struct StoredSession {
    session: Session,
    messages: Vec<Message>,
    /// Monotonic insertion counter, the tie-break for list ordering
    inserted: u64,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<Uuid, StoredSession>,
    insert_counter: u64,
}

/// Process-local session store behind a single async lock
#[derive(Default)]
pub struct InMemorySessionStore {
    inner: Mutex<Inner>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, owner_id: Uuid) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::now_v7(),
            owner_id,
            status: SessionStatus::Active,
            started_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.lock().await;
        let inserted = inner.insert_counter;
        inner.insert_counter += 1;
        inner.sessions.insert(
            session.id,
            StoredSession {
                session: session.clone(),
                messages: Vec::new(),
                inserted,
            },
        );

        Ok(session)
    }

    async fn get(&self, session_id: Uuid, owner_id: Uuid) -> Result<Option<Session>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sessions
            .get(&session_id)
            .filter(|stored| stored.session.owner_id == owner_id)
            .map(|stored| stored.session.clone()))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Session>> {
        let inner = self.inner.lock().await;
        let mut sessions: Vec<&StoredSession> = inner
            .sessions
            .values()
            .filter(|stored| stored.session.owner_id == owner_id)
            .collect();

        sessions.sort_by(|a, b| {
            b.session
                .updated_at
                .cmp(&a.session.updated_at)
                .then(a.inserted.cmp(&b.inserted))
        });

        Ok(sessions
            .into_iter()
            .map(|stored| stored.session.clone())
            .collect())
    }

    async fn history(&self, session_id: Uuid, owner_id: Uuid) -> Result<Option<Vec<Message>>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sessions
            .get(&session_id)
            .filter(|stored| stored.session.owner_id == owner_id)
            .map(|stored| stored.messages.clone()))
    }

    async fn append(
        &self,
        session_id: Uuid,
        owner_id: Uuid,
        messages: Vec<NewMessage>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let stored = inner
            .sessions
            .get_mut(&session_id)
            .filter(|stored| stored.session.owner_id == owner_id)
            .ok_or(ChatError::SessionNotFound(session_id))?;

        let now = Utc::now();
        for message in messages {
            stored.messages.push(Message {
                id: Uuid::now_v7(),
                session_id,
                role: message.role,
                content: message.content,
                metadata: message.metadata,
                timestamp: now,
            });
        }
        stored.session.updated_at = now;

        Ok(())
    }

    async fn complete(&self, session_id: Uuid, owner_id: Uuid) -> Result<Option<Session>> {
        let mut inner = self.inner.lock().await;
        let Some(stored) = inner
            .sessions
            .get_mut(&session_id)
            .filter(|stored| stored.session.owner_id == owner_id)
        else {
            return Ok(None);
        };

        stored.session.status = SessionStatus::Completed;
        stored.session.updated_at = Utc::now();
        Ok(Some(stored.session.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageRole;

    #[tokio::test]
    async fn test_create_and_get_are_owner_scoped() {
        let store = InMemorySessionStore::new();
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();

        assert!(store.get(session.id, owner).await.unwrap().is_some());
        assert!(store
            .get(session.id, Uuid::now_v7())
            .await
            .unwrap()
            .is_none());
        assert!(store
            .history(session.id, Uuid::now_v7())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_append_to_missing_session_fails() {
        let store = InMemorySessionStore::new();
        let err = store
            .append(Uuid::now_v7(), Uuid::now_v7(), vec![NewMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_append_preserves_order_and_bumps_updated_at() {
        let store = InMemorySessionStore::new();
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();

        store
            .append(
                session.id,
                owner,
                vec![NewMessage::user("one"), NewMessage::user("two")],
            )
            .await
            .unwrap();

        let history = store.history(session.id, owner).await.unwrap().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "one");
        assert_eq!(history[1].content, "two");
        assert_eq!(history[0].role, MessageRole::User);
        assert!(history[0].timestamp <= history[1].timestamp);

        let updated = store.get(session.id, owner).await.unwrap().unwrap();
        assert!(updated.updated_at >= session.updated_at);
    }

    #[tokio::test]
    async fn test_list_orders_by_updated_at_then_insertion() {
        let store = InMemorySessionStore::new();
        let owner = Uuid::now_v7();
        let first = store.create(owner).await.unwrap();
        let second = store.create(owner).await.unwrap();
        let third = store.create(owner).await.unwrap();

        // Appending to the oldest session moves it to the front
        store
            .append(first.id, owner, vec![NewMessage::user("hello")])
            .await
            .unwrap();

        let listed = store.list_by_owner(owner).await.unwrap();
        assert_eq!(listed[0].id, first.id);

        // The untouched sessions keep their relative order behind it
        let rest: Vec<Uuid> = listed[1..].iter().map(|s| s.id).collect();
        assert_eq!(rest, vec![second.id, third.id]);
    }

    #[tokio::test]
    async fn test_list_excludes_other_owners() {
        let store = InMemorySessionStore::new();
        let owner = Uuid::now_v7();
        let other = Uuid::now_v7();
        store.create(owner).await.unwrap();
        store.create(other).await.unwrap();

        let listed = store.list_by_owner(owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner_id, owner);
    }

    #[tokio::test]
    async fn test_complete_transitions_status() {
        let store = InMemorySessionStore::new();
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();
        assert_eq!(session.status, SessionStatus::Active);

        let completed = store.complete(session.id, owner).await.unwrap().unwrap();
        assert_eq!(completed.status, SessionStatus::Completed);

        assert!(store
            .complete(session.id, Uuid::now_v7())
            .await
            .unwrap()
            .is_none());
    }
}
