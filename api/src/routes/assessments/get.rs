use axum::{
    Json,
    extract::{Path, State},
};
use db::models::assessment;
use services::eligibility_service::{self, EligibilityReport};
use services::reporting_service::{self, AssessmentStatistics, StudentResult, UserResultRow};

use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;
use services::ServiceError;

/// GET /api/assessments/{identity}/results
pub async fn results(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserResultRow>>>, ApiError> {
    let rows = reporting_service::assessment_results(state.db(), user.actor(), &identity).await?;
    Ok(Json(ApiResponse::success(rows, "Results retrieved")))
}

/// GET /api/assessments/{identity}/results/{user_id}
pub async fn student_result(
    State(state): State<AppState>,
    Path((identity, user_id)): Path<(String, i64)>,
    user: AuthUser,
) -> Result<Json<ApiResponse<StudentResult>>, ApiError> {
    let result =
        reporting_service::student_result(state.db(), user.actor(), &identity, user_id).await?;
    Ok(Json(ApiResponse::success(result, "Result retrieved")))
}

/// GET /api/assessments/{identity}/statistics
pub async fn statistics(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    user: AuthUser,
) -> Result<Json<ApiResponse<AssessmentStatistics>>, ApiError> {
    let stats =
        reporting_service::assessment_statistics(state.db(), user.actor(), &identity).await?;
    Ok(Json(ApiResponse::success(stats, "Statistics retrieved")))
}

/// GET /api/assessments/{identity}/eligibility
pub async fn eligibility(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    user: AuthUser,
) -> Result<Json<ApiResponse<EligibilityReport>>, ApiError> {
    let found = assessment::Model::find_by_identity(state.db(), &identity)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::NotFound("assessment not found".to_string()))?;
    let report =
        eligibility_service::resolve_for_assessment(state.db(), user.0.sub, found.id).await?;
    Ok(Json(ApiResponse::success(report, "Eligibility resolved")))
}
