use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A deal has no owner column of its own; ownership resolves transitively
/// through the parent contact.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: i64,
    pub contact_id: i64,
    pub title: String,
    pub amount: f64,
    pub stage: String,
    pub created_at: DateTime<Utc>,
}
