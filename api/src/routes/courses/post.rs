use axum::{
    Json,
    extract::{Path, State},
};
use db::models::{course, course_enrollment};
use services::{enrollment_service, status_service};

use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

/// POST /api/courses/{identity}/complete
///
/// The explicit completion path: forces the course and its content to
/// Completed regardless of their current statuses.
pub async fn complete(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    user: AuthUser,
) -> Result<Json<ApiResponse<course::Model>>, ApiError> {
    let completed =
        status_service::mark_course_complete(state.db(), user.actor(), &identity).await?;
    Ok(Json(ApiResponse::success(completed, "Course completed")))
}

/// POST /api/courses/{identity}/enroll
pub async fn enroll(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    user: AuthUser,
) -> Result<Json<ApiResponse<course_enrollment::Model>>, ApiError> {
    let enrollment =
        enrollment_service::enroll(state.db(), state.notifier(), user.actor(), &identity).await?;
    Ok(Json(ApiResponse::success(enrollment, "Enrolled on course")))
}
