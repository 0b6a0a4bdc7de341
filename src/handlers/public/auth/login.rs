use axum::response::Json;
use serde_json::{json, Value};

use super::CredentialsRequest;
use crate::error::ApiError;
use crate::services::user_service::UserService;

/// POST /auth/login - verify credentials and hand out a bearer token.
///
/// Unknown email and wrong password produce the same 401 body.
pub async fn login_post(Json(payload): Json<CredentialsRequest>) -> Result<Json<Value>, ApiError> {
    let (email, password) = payload.validate()?;

    let service = UserService::new().await?;
    let token = service.login(&email, &password).await?;

    Ok(Json(json!({ "token": token })))
}
