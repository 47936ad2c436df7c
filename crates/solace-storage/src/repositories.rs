// Repository layer for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // ============================================
    // Sessions
    // ============================================

    pub async fn create_session(&self, owner_id: Uuid) -> Result<SessionRow> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (id, owner_id, status)
            VALUES ($1, $2, 'active')
            RETURNING id, owner_id, status, started_at, updated_at, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_session(&self, id: Uuid, owner_id: Uuid) -> Result<Option<SessionRow>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, owner_id, status, started_at, updated_at, created_at
            FROM sessions
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_sessions(&self, owner_id: Uuid) -> Result<Vec<SessionRow>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, owner_id, status, started_at, updated_at, created_at
            FROM sessions
            WHERE owner_id = $1
            ORDER BY updated_at DESC, created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn complete_session(&self, id: Uuid, owner_id: Uuid) -> Result<Option<SessionRow>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            UPDATE sessions
            SET status = 'completed', updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, status, started_at, updated_at, created_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Messages
    // ============================================

    pub async fn list_messages(&self, session_id: Uuid) -> Result<Vec<MessageRow>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, session_id, sequence, role, content, metadata, created_at
            FROM messages
            WHERE session_id = $1
            ORDER BY sequence ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Append messages to a session in one transaction.
    ///
    /// The session row is locked for the duration so concurrently appended
    /// pairs can never interleave, and the whole batch is all-or-nothing.
    /// Returns false when the session does not exist for this owner.
    pub async fn append_messages(
        &self,
        session_id: Uuid,
        owner_id: Uuid,
        messages: Vec<NewMessageRow>,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM sessions
            WHERE id = $1 AND owner_id = $2
            FOR UPDATE
            "#,
        )
        .bind(session_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            return Ok(false);
        }

        for message in messages {
            sqlx::query(
                r#"
                INSERT INTO messages (id, session_id, sequence, role, content, metadata)
                VALUES ($1, $2, COALESCE((SELECT MAX(sequence) + 1 FROM messages WHERE session_id = $2), 1), $3, $4, $5)
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(session_id)
            .bind(&message.role)
            .bind(&message.content)
            .bind(&message.metadata)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE sessions SET updated_at = NOW() WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(true)
    }

    // ============================================
    // Moods
    // ============================================

    pub async fn create_mood(&self, input: CreateMood) -> Result<MoodRow> {
        let row = sqlx::query_as::<_, MoodRow>(
            r#"
            INSERT INTO moods (id, owner_id, score, note)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, score, note, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.owner_id)
        .bind(input.score)
        .bind(&input.note)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_moods(&self, owner_id: Uuid) -> Result<Vec<MoodRow>> {
        let rows = sqlx::query_as::<_, MoodRow>(
            r#"
            SELECT id, owner_id, score, note, created_at
            FROM moods
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
