use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::models::Contact;
use crate::error::ApiError;
use crate::handlers::utils::{parse_id, validate_email_format, validate_page_params};
use crate::middleware::AuthUser;
use crate::services::contact_service::{ContactFields, ContactPatch, ContactService};
use crate::services::ownership::OwnershipGuard;
use crate::services::Page;

#[derive(Debug, Deserialize)]
pub struct ContactsListQuery {
    pub search: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactCreateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
}

impl ContactCreateRequest {
    fn validate(self) -> Result<ContactFields, ApiError> {
        let mut field_errors = HashMap::new();

        let name = self.name.unwrap_or_default();
        if name.is_empty() {
            field_errors.insert("name".to_string(), "must not be empty".to_string());
        }

        let email = self.email.unwrap_or_default();
        if let Err(msg) = validate_email_format(&email) {
            field_errors.insert("email".to_string(), msg);
        }

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("validation failed", Some(field_errors)));
        }

        Ok(ContactFields {
            name,
            email,
            company: self.company.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
}

impl ContactUpdateRequest {
    fn validate(self) -> Result<ContactPatch, ApiError> {
        let mut field_errors = HashMap::new();

        if let Some(name) = &self.name {
            if name.is_empty() {
                field_errors.insert("name".to_string(), "must not be empty".to_string());
            }
        }

        if let Some(email) = &self.email {
            if let Err(msg) = validate_email_format(email) {
                field_errors.insert("email".to_string(), msg);
            }
        }

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("validation failed", Some(field_errors)));
        }

        Ok(ContactPatch {
            name: self.name,
            email: self.email,
            company: self.company,
            phone: self.phone,
        })
    }
}

/// GET /contacts - list the principal's contacts with search and pagination
pub async fn list(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ContactsListQuery>,
) -> Result<Json<Page<Contact>>, ApiError> {
    let (page, page_size) = validate_page_params(query.page.as_deref(), query.page_size.as_deref())?;
    let search = query.search.unwrap_or_default();

    let service = ContactService::new().await?;
    let result = service.list(user.user_id, &search, page, page_size).await?;

    Ok(Json(result))
}

/// POST /contacts - create a contact owned by the principal
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ContactCreateRequest>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let fields = payload.validate()?;

    let service = ContactService::new().await?;
    let contact = service.create(user.user_id, fields).await?;

    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /contacts/{id} - single contact; 404 for missing and not-owned alike
pub async fn get(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    let id = parse_id(&id)?;

    let service = ContactService::new().await?;
    let contact = service.get(id, user.user_id).await?;

    Ok(Json(contact))
}

/// PATCH /contacts/{id} - partial update of an owned contact
pub async fn patch(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<ContactUpdateRequest>,
) -> Result<Json<Contact>, ApiError> {
    let id = parse_id(&id)?;
    let patch = payload.validate()?;

    let guard = OwnershipGuard::new().await?;
    guard.assert_owns_contact(id, user.user_id).await?;

    let service = ContactService::new().await?;
    let contact = service.update(id, patch).await?;

    Ok(Json(contact))
}

/// DELETE /contacts/{id} - delete an owned contact and its notes and deals
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    let guard = OwnershipGuard::new().await?;
    guard.assert_owns_contact(id, user.user_id).await?;

    let service = ContactService::new().await?;
    service.delete(id).await?;

    Ok(Json(json!({ "ok": true })))
}
