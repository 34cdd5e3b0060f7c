use axum::{
    Json,
    extract::{Path, State},
};
use services::status_service;

use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResponse, Empty};
use crate::state::AppState;

/// DELETE /api/courses/{identity}
pub async fn remove(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    status_service::delete_course(state.db(), user.actor(), &identity).await?;
    Ok(Json(ApiResponse::success(Empty, "Course deleted")))
}
