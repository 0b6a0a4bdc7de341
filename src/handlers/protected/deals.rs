use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::models::Deal;
use crate::error::ApiError;
use crate::handlers::utils::{coerce_integer, coerce_number, parse_id, validate_page_params};
use crate::middleware::AuthUser;
use crate::services::deal_service::{DealFields, DealPatch, DealService, DealWithContact};
use crate::services::ownership::OwnershipGuard;
use crate::services::Page;

const DEFAULT_STAGE: &str = "Prospect";

#[derive(Debug, Deserialize)]
pub struct DealsListQuery {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DealCreateRequest {
    pub title: Option<String>,
    pub amount: Option<Value>,
    pub stage: Option<String>,
    #[serde(rename = "contactId")]
    pub contact_id: Option<Value>,
}

impl DealCreateRequest {
    fn validate(self) -> Result<DealFields, ApiError> {
        let mut field_errors = HashMap::new();

        let title = self.title.unwrap_or_default();
        if title.is_empty() {
            field_errors.insert("title".to_string(), "must not be empty".to_string());
        }

        let contact_id = match self.contact_id.as_ref().and_then(coerce_integer) {
            Some(id) if id >= 1 => id,
            _ => {
                field_errors.insert(
                    "contactId".to_string(),
                    "must be an integer greater than or equal to 1".to_string(),
                );
                0
            }
        };

        let amount = match self.amount {
            None => 0.0,
            Some(value) => match coerce_number(&value) {
                Some(n) if n.is_finite() && n >= 0.0 => n,
                _ => {
                    field_errors.insert(
                        "amount".to_string(),
                        "must be a non-negative number".to_string(),
                    );
                    0.0
                }
            },
        };

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("validation failed", Some(field_errors)));
        }

        Ok(DealFields {
            contact_id,
            title,
            amount,
            stage: self.stage.unwrap_or_else(|| DEFAULT_STAGE.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DealUpdateRequest {
    pub title: Option<String>,
    pub amount: Option<Value>,
    pub stage: Option<String>,
}

impl DealUpdateRequest {
    fn validate(self) -> Result<DealPatch, ApiError> {
        let mut field_errors = HashMap::new();

        if let Some(title) = &self.title {
            if title.is_empty() {
                field_errors.insert("title".to_string(), "must not be empty".to_string());
            }
        }

        let amount = match self.amount {
            None => None,
            Some(value) => match coerce_number(&value) {
                Some(n) if n.is_finite() && n >= 0.0 => Some(n),
                _ => {
                    field_errors.insert(
                        "amount".to_string(),
                        "must be a non-negative number".to_string(),
                    );
                    None
                }
            },
        };

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("validation failed", Some(field_errors)));
        }

        Ok(DealPatch {
            title: self.title,
            amount,
            stage: self.stage,
        })
    }
}

/// GET /deals - list the principal's deals via contact ownership
pub async fn list(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DealsListQuery>,
) -> Result<Json<Page<DealWithContact>>, ApiError> {
    let (page, page_size) = validate_page_params(query.page.as_deref(), query.page_size.as_deref())?;

    let service = DealService::new().await?;
    let result = service.list(user.user_id, page, page_size).await?;

    Ok(Json(result))
}

/// POST /deals - create a deal under a contact the principal owns
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<DealCreateRequest>,
) -> Result<(StatusCode, Json<Deal>), ApiError> {
    let fields = payload.validate()?;

    let guard = OwnershipGuard::new().await?;
    guard.assert_owns_contact(fields.contact_id, user.user_id).await?;

    let service = DealService::new().await?;
    let deal = service.create(fields).await?;

    Ok((StatusCode::CREATED, Json(deal)))
}

/// PATCH /deals/{id} - partial update of an owned deal
pub async fn patch(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<DealUpdateRequest>,
) -> Result<Json<Deal>, ApiError> {
    let id = parse_id(&id)?;
    let patch = payload.validate()?;

    let guard = OwnershipGuard::new().await?;
    guard.assert_owns_deal(id, user.user_id).await?;

    let service = DealService::new().await?;
    let deal = service.update(id, patch).await?;

    Ok(Json(deal))
}

/// DELETE /deals/{id} - delete an owned deal
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    let guard = OwnershipGuard::new().await?;
    guard.assert_owns_deal(id, user.user_id).await?;

    let service = DealService::new().await?;
    service.delete(id).await?;

    Ok(Json(json!({ "ok": true })))
}
