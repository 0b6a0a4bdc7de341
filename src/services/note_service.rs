use sqlx::PgPool;

use crate::database::manager::DatabaseManager;
use crate::database::models::Note;
use crate::services::ResourceError;

/// Notes live under a contact. Callers must have already checked ownership
/// of the parent contact; the author id is recorded for display only and
/// plays no role in authorization.
pub struct NoteService {
    pool: PgPool,
}

impl NoteService {
    pub async fn new() -> Result<Self, ResourceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub async fn list_for_contact(&self, contact_id: i64) -> Result<Vec<Note>, ResourceError> {
        let notes: Vec<Note> = sqlx::query_as(
            "SELECT id, contact_id, author_id, body, created_at \
             FROM notes WHERE contact_id = $1 ORDER BY id DESC",
        )
        .bind(contact_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn create(
        &self,
        contact_id: i64,
        author_id: i64,
        body: &str,
    ) -> Result<Note, ResourceError> {
        let note: Note = sqlx::query_as(
            "INSERT INTO notes (contact_id, author_id, body) VALUES ($1, $2, $3) \
             RETURNING id, contact_id, author_id, body, created_at",
        )
        .bind(contact_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(note)
    }
}
