use sqlx::PgPool;

use crate::database::manager::DatabaseManager;
use crate::database::models::Contact;
use crate::services::{Page, ResourceError};

/// Validated fields for contact creation. Owner is never client-supplied;
/// it is always the requesting principal.
#[derive(Debug)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
}

/// Partial update; only supplied fields are touched.
#[derive(Debug, Default)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
}

pub struct ContactService {
    pool: PgPool,
}

impl ContactService {
    pub async fn new() -> Result<Self, ResourceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// List the principal's contacts, newest first. `search` is a
    /// case-sensitive substring match against name, email or company.
    pub async fn list(
        &self,
        owner_id: i64,
        search: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Page<Contact>, ResourceError> {
        let offset = (page - 1) * page_size;

        let (items, total) = if search.is_empty() {
            let items: Vec<Contact> = sqlx::query_as(
                "SELECT id, owner_id, name, email, company, phone, created_at \
                 FROM contacts WHERE owner_id = $1 \
                 ORDER BY id DESC LIMIT $2 OFFSET $3",
            )
            .bind(owner_id)
            .bind(page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            let (total,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM contacts WHERE owner_id = $1")
                    .bind(owner_id)
                    .fetch_one(&self.pool)
                    .await?;

            (items, total)
        } else {
            let pattern = like_pattern(search);

            let items: Vec<Contact> = sqlx::query_as(
                "SELECT id, owner_id, name, email, company, phone, created_at \
                 FROM contacts WHERE owner_id = $1 \
                 AND (name LIKE $2 ESCAPE '\\' OR email LIKE $2 ESCAPE '\\' OR company LIKE $2 ESCAPE '\\') \
                 ORDER BY id DESC LIMIT $3 OFFSET $4",
            )
            .bind(owner_id)
            .bind(&pattern)
            .bind(page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            let (total,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM contacts WHERE owner_id = $1 \
                 AND (name LIKE $2 ESCAPE '\\' OR email LIKE $2 ESCAPE '\\' OR company LIKE $2 ESCAPE '\\')",
            )
            .bind(owner_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

            (items, total)
        };

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    pub async fn create(
        &self,
        owner_id: i64,
        fields: ContactFields,
    ) -> Result<Contact, ResourceError> {
        let contact: Contact = sqlx::query_as(
            "INSERT INTO contacts (owner_id, name, email, company, phone) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, owner_id, name, email, company, phone, created_at",
        )
        .bind(owner_id)
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.company)
        .bind(&fields.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Single-contact read. A missing row and a row owned by someone else
    /// both come back as `NotFound`; this read path reports 404 where the
    /// mutation paths report 403.
    pub async fn get(&self, id: i64, owner_id: i64) -> Result<Contact, ResourceError> {
        let contact: Option<Contact> = sqlx::query_as(
            "SELECT id, owner_id, name, email, company, phone, created_at \
             FROM contacts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match contact {
            Some(c) if c.owner_id == owner_id => Ok(c),
            _ => Err(ResourceError::NotFound),
        }
    }

    pub async fn update(&self, id: i64, patch: ContactPatch) -> Result<Contact, ResourceError> {
        let contact: Option<Contact> = sqlx::query_as(
            "UPDATE contacts SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                company = COALESCE($4, company), \
                phone = COALESCE($5, phone) \
             WHERE id = $1 \
             RETURNING id, owner_id, name, email, company, phone, created_at",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.company)
        .bind(patch.phone)
        .fetch_optional(&self.pool)
        .await?;

        contact.ok_or(ResourceError::NotFound)
    }

    /// Delete a contact and its children. The store has no cascade, so
    /// notes and deals are removed explicitly first. The three statements
    /// are not one transaction; a crash mid-sequence can orphan children.
    pub async fn delete(&self, id: i64) -> Result<(), ResourceError> {
        sqlx::query("DELETE FROM notes WHERE contact_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM deals WHERE contact_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Build a `%term%` LIKE pattern, escaping the wildcard characters in the
/// user-supplied term so they match literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_term() {
        assert_eq!(like_pattern("acme"), "%acme%");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c\\d"), "%c\\\\d%");
    }
}
