use axum::{http::StatusCode, response::Json, Extension};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::analytics_service::{AnalyticsService, AnalyticsSnapshot};

/// GET /analytics - the principal's rollup, computed on first request and
/// served from cache afterwards
pub async fn get(
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AnalyticsSnapshot>, ApiError> {
    let snapshot = AnalyticsService::get(user.user_id).await?;
    Ok(Json(snapshot))
}

/// POST /analytics:recalc - queue a background recompute and return
/// immediately; poll GET /analytics to observe the update
pub async fn recalc(Extension(user): Extension<AuthUser>) -> (StatusCode, Json<Value>) {
    AnalyticsService::recalculate(user.user_id);

    (
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Recalculation started" })),
    )
}
