use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}
