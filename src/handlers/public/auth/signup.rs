use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use super::CredentialsRequest;
use crate::error::ApiError;
use crate::services::user_service::UserService;

/// POST /auth/signup - create a new account.
///
/// Returns 201 with the new user's id and email, 409 when the email is
/// already registered, 400 on validation failure.
pub async fn signup_post(
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (email, password) = payload.validate()?;

    let service = UserService::new().await?;
    let user = service.signup(&email, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": user.id, "email": user.email })),
    ))
}
