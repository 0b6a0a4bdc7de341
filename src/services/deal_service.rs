use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Contact, Deal};
use crate::services::{Page, ResourceError};

/// Validated fields for deal creation. The parent contact must already have
/// passed the ownership guard.
#[derive(Debug)]
pub struct DealFields {
    pub contact_id: i64,
    pub title: String,
    pub amount: f64,
    pub stage: String,
}

/// Partial update; only supplied fields are touched.
#[derive(Debug, Default)]
pub struct DealPatch {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub stage: Option<String>,
}

/// List items embed the parent contact, as API consumers render deals with
/// their contact inline.
#[derive(Debug, Serialize)]
pub struct DealWithContact {
    #[serde(flatten)]
    pub deal: Deal,
    pub contact: Contact,
}

pub struct DealService {
    pool: PgPool,
}

impl DealService {
    pub async fn new() -> Result<Self, ResourceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// List the principal's deals, newest first. Deals have no owner column,
    /// so scoping joins through the parent contact's owner.
    pub async fn list(
        &self,
        owner_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<Page<DealWithContact>, ResourceError> {
        let offset = (page - 1) * page_size;

        let deals: Vec<Deal> = sqlx::query_as(
            "SELECT d.id, d.contact_id, d.title, d.amount, d.stage, d.created_at \
             FROM deals d JOIN contacts c ON c.id = d.contact_id \
             WHERE c.owner_id = $1 \
             ORDER BY d.id DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM deals d JOIN contacts c ON c.id = d.contact_id \
             WHERE c.owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        let mut contact_ids: Vec<i64> = deals.iter().map(|d| d.contact_id).collect();
        contact_ids.sort_unstable();
        contact_ids.dedup();

        let contacts: Vec<Contact> = sqlx::query_as(
            "SELECT id, owner_id, name, email, company, phone, created_at \
             FROM contacts WHERE id = ANY($1)",
        )
        .bind(&contact_ids)
        .fetch_all(&self.pool)
        .await?;

        let by_id: HashMap<i64, Contact> = contacts.into_iter().map(|c| (c.id, c)).collect();

        let items = deals
            .into_iter()
            .filter_map(|deal| {
                by_id.get(&deal.contact_id).cloned().map(|contact| DealWithContact {
                    deal,
                    contact,
                })
            })
            .collect();

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    pub async fn create(&self, fields: DealFields) -> Result<Deal, ResourceError> {
        let deal: Deal = sqlx::query_as(
            "INSERT INTO deals (contact_id, title, amount, stage) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, contact_id, title, amount, stage, created_at",
        )
        .bind(fields.contact_id)
        .bind(&fields.title)
        .bind(fields.amount)
        .bind(&fields.stage)
        .fetch_one(&self.pool)
        .await?;

        Ok(deal)
    }

    pub async fn update(&self, id: i64, patch: DealPatch) -> Result<Deal, ResourceError> {
        let deal: Option<Deal> = sqlx::query_as(
            "UPDATE deals SET \
                title = COALESCE($2, title), \
                amount = COALESCE($3, amount), \
                stage = COALESCE($4, stage) \
             WHERE id = $1 \
             RETURNING id, contact_id, title, amount, stage, created_at",
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.amount)
        .bind(patch.stage)
        .fetch_optional(&self.pool)
        .await?;

        deal.ok_or(ResourceError::NotFound)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ResourceError> {
        sqlx::query("DELETE FROM deals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
