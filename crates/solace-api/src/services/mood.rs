// Mood-entry storage
//
// Thin plumbing around per-user mood scores; the chat pipeline never
// reads these. The trait keeps the backing store swappable the same way
// SessionStore does for sessions.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use solace_contracts::MoodEntry;
use solace_storage::{CreateMood, Database};
use tokio::sync::Mutex;
use uuid::Uuid;

#[async_trait]
pub trait MoodStore: Send + Sync {
    async fn create(&self, owner_id: Uuid, score: i32, note: Option<String>) -> Result<MoodEntry>;

    /// Entries for one owner, most recent first
    async fn list(&self, owner_id: Uuid) -> Result<Vec<MoodEntry>>;
}

// ============================================
// Postgres-backed store
// ============================================

#[async_trait]
impl MoodStore for Database {
    async fn create(&self, owner_id: Uuid, score: i32, note: Option<String>) -> Result<MoodEntry> {
        let row = self
            .create_mood(CreateMood {
                owner_id,
                score,
                note,
            })
            .await?;

        Ok(MoodEntry {
            id: row.id,
            owner_id: row.owner_id,
            score: row.score,
            note: row.note,
            created_at: row.created_at,
        })
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<MoodEntry>> {
        let rows = self.list_moods(owner_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| MoodEntry {
                id: row.id,
                owner_id: row.owner_id,
                score: row.score,
                note: row.note,
                created_at: row.created_at,
            })
            .collect())
    }
}

// ============================================
// In-memory store (tests and dev runs)
// ============================================

#[derive(Default)]
pub struct InMemoryMoodStore {
    entries: Mutex<Vec<MoodEntry>>,
}

impl InMemoryMoodStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MoodStore for InMemoryMoodStore {
    async fn create(&self, owner_id: Uuid, score: i32, note: Option<String>) -> Result<MoodEntry> {
        let entry = MoodEntry {
            id: Uuid::now_v7(),
            owner_id,
            score,
            note,
            created_at: Utc::now(),
        };

        self.entries.lock().await.push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<MoodEntry>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .rev()
            .cloned()
            .collect())
    }
}
