use axum::{
    Json,
    extract::{Path, State},
};
use db::models::assessment;
use db::models::lifecycle::LifecycleStatus;
use serde::Deserialize;
use services::status_service;

use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: LifecycleStatus,
    pub message: Option<String>,
}

/// PUT /api/assessments/{identity}/status
pub async fn set_status(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    user: AuthUser,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<ApiResponse<assessment::Model>>, ApiError> {
    let updated = status_service::change_assessment_status(
        state.db(),
        state.notifier(),
        user.actor(),
        &identity,
        payload.status,
        payload.message,
    )
    .await?;
    Ok(Json(ApiResponse::success(
        updated,
        "Assessment status updated",
    )))
}
