use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{EntryKind, JournalEntry};

use super::{DayWindow, EntryChanges, EntryStore, NewEntry, StorageError};

/// Postgres-backed entry store. Every query carries the owner predicate;
/// there is no code path that reads another owner's rows.
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn list(&self, owner_id: &str) -> Result<Vec<JournalEntry>, StorageError> {
        let entries = sqlx::query_as::<sqlx::Postgres, JournalEntry>(
            r#"SELECT * FROM entries WHERE owner_id = $1 ORDER BY date DESC"#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn get(&self, owner_id: &str, id: Uuid) -> Result<Option<JournalEntry>, StorageError> {
        let entry = sqlx::query_as::<sqlx::Postgres, JournalEntry>(
            r#"SELECT * FROM entries WHERE owner_id = $1 AND id = $2"#,
        )
        .bind(owner_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn create(&self, owner_id: &str, entry: NewEntry) -> Result<Uuid, StorageError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO entries (
                owner_id, date, title, content, kind, summary, tone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(entry.date)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(entry.kind)
        .bind(&entry.summary)
        .bind(&entry.tone)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(
        &self,
        owner_id: &str,
        id: Uuid,
        changes: EntryChanges,
    ) -> Result<Option<JournalEntry>, StorageError> {
        // A new content payload invalidates annotations derived from the
        // old one, so they are cleared in the same statement.
        let entry = sqlx::query_as::<_, JournalEntry>(
            r#"
            UPDATE entries SET
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                summary = CASE WHEN $4::text IS NULL THEN summary ELSE NULL END,
                tone = CASE WHEN $4::text IS NULL THEN tone ELSE NULL END
            WHERE owner_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query(r#"DELETE FROM entries WHERE owner_id = $1 AND id = $2"#)
            .bind(owner_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_reflection_in(
        &self,
        owner_id: &str,
        window: DayWindow,
    ) -> Result<Option<JournalEntry>, StorageError> {
        let entry = sqlx::query_as::<sqlx::Postgres, JournalEntry>(
            r#"SELECT * FROM entries WHERE owner_id = $1 AND kind = $2 AND date >= $3 AND date < $4 ORDER BY date DESC LIMIT 1"#,
        )
        .bind(owner_id)
        .bind(EntryKind::Reflection)
        .bind(window.start)
        .bind(window.end)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }
}
