use sqlx::PgPool;
use thiserror::Error;

use crate::database::manager::{DatabaseError, DatabaseManager};

#[derive(Debug, Error)]
pub enum OwnershipError {
    /// The row does not exist or belongs to another user. The two cases are
    /// deliberately indistinguishable so existence of other users' rows is
    /// not disclosed by status code.
    #[error("resource is not owned by the requesting user")]
    NotOwned,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
}

/// The only authorization primitives in the system. Every mutating or
/// single-resource endpoint on contacts, notes and deals calls one of these
/// after parsing input and before any write.
pub struct OwnershipGuard {
    pool: PgPool,
}

impl OwnershipGuard {
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Fails with `NotOwned` when the contact is absent or owned by someone
    /// else.
    pub async fn assert_owns_contact(
        &self,
        contact_id: i64,
        principal_id: i64,
    ) -> Result<(), OwnershipError> {
        let owner: Option<(i64,)> =
            sqlx::query_as("SELECT owner_id FROM contacts WHERE id = $1")
                .bind(contact_id)
                .fetch_optional(&self.pool)
                .await?;

        match owner {
            Some((owner_id,)) if owner_id == principal_id => Ok(()),
            _ => Err(OwnershipError::NotOwned),
        }
    }

    /// Deals carry no owner column; resolution is an explicit two-step walk
    /// from the deal to its parent contact, then to that contact's owner.
    pub async fn assert_owns_deal(
        &self,
        deal_id: i64,
        principal_id: i64,
    ) -> Result<(), OwnershipError> {
        let parent: Option<(i64,)> =
            sqlx::query_as("SELECT contact_id FROM deals WHERE id = $1")
                .bind(deal_id)
                .fetch_optional(&self.pool)
                .await?;

        match parent {
            Some((contact_id,)) => self.assert_owns_contact(contact_id, principal_id).await,
            None => Err(OwnershipError::NotOwned),
        }
    }
}
