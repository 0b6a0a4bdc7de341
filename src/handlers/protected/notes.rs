use axum::{extract::Path, http::StatusCode, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::models::Note;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::AuthUser;
use crate::services::note_service::NoteService;
use crate::services::ownership::OwnershipGuard;

#[derive(Debug, Deserialize)]
pub struct NoteCreateRequest {
    pub body: Option<String>,
}

impl NoteCreateRequest {
    fn validate(self) -> Result<String, ApiError> {
        let body = self.body.unwrap_or_default();
        if body.is_empty() {
            let mut field_errors = HashMap::new();
            field_errors.insert("body".to_string(), "must not be empty".to_string());
            return Err(ApiError::validation_error("validation failed", Some(field_errors)));
        }
        Ok(body)
    }
}

/// GET /contacts/{id}/notes - notes for an owned contact, newest first
pub async fn list(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let contact_id = parse_id(&id)?;

    let guard = OwnershipGuard::new().await?;
    guard.assert_owns_contact(contact_id, user.user_id).await?;

    let service = NoteService::new().await?;
    let notes = service.list_for_contact(contact_id).await?;

    Ok(Json(json!({ "items": notes })))
}

/// POST /contacts/{id}/notes - add a note under an owned contact. The
/// principal is recorded as the author but authorization stays with the
/// contact's owner.
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<NoteCreateRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let contact_id = parse_id(&id)?;
    let body = payload.validate()?;

    let guard = OwnershipGuard::new().await?;
    guard.assert_owns_contact(contact_id, user.user_id).await?;

    let service = NoteService::new().await?;
    let note = service.create(contact_id, user.user_id, &body).await?;

    Ok((StatusCode::CREATED, Json(note)))
}
