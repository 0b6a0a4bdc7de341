use serde::Serialize;
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::services::ownership::OwnershipError;

pub mod analytics_service;
pub mod contact_service;
pub mod deal_service;
pub mod note_service;
pub mod ownership;
pub mod user_service;

/// Shared error type for the resource collections (contacts, notes, deals)
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
}

/// One page of a collection listing. `total` always reflects the full
/// filtered count, independent of the requested page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}
