use axum::{
    Json,
    extract::{Path, State},
};
use db::models::course;
use serde::Serialize;
use services::ServiceError;
use services::eligibility_service::{self, EligibilityReport};
use services::enrollment_service::{self, EnrollmentStatus};

use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

#[derive(Serialize)]
pub struct CourseEligibility {
    pub enrollment_status: EnrollmentStatus,
    #[serde(flatten)]
    pub report: EligibilityReport,
}

/// GET /api/courses/{identity}/eligibility
///
/// Resolves both the caller's relationship to the course and the
/// eligibility rules in one round trip.
pub async fn eligibility(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    user: AuthUser,
) -> Result<Json<ApiResponse<CourseEligibility>>, ApiError> {
    let found = course::Model::find_by_identity(state.db(), &identity)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::NotFound("course not found".to_string()))?;
    let enrollment_status =
        enrollment_service::enrollment_status(state.db(), user.0.sub, &found).await?;
    let report = eligibility_service::resolve_for_course(state.db(), user.0.sub, found.id).await?;
    Ok(Json(ApiResponse::success(
        CourseEligibility {
            enrollment_status,
            report,
        },
        "Eligibility resolved",
    )))
}
