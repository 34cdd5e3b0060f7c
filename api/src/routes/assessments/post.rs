use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use services::assessment_service::{self, StartedAssessment};
use services::exam_service::{AnswerInput, SubmissionOutcome};

use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

/// POST /api/assessments/{identity}/start
pub async fn start(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    user: AuthUser,
) -> Result<Json<ApiResponse<StartedAssessment>>, ApiError> {
    let started = assessment_service::start_assessment(state.db(), user.actor(), &identity).await?;
    Ok(Json(ApiResponse::success(started, "Assessment started")))
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub answers: Vec<AnswerInput>,
}

/// POST /api/assessments/{identity}/submissions/{submission_id}
pub async fn submit(
    State(state): State<AppState>,
    Path((identity, submission_id)): Path<(String, i64)>,
    user: AuthUser,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<ApiResponse<SubmissionOutcome>>, ApiError> {
    let outcome = assessment_service::submit_assessment(
        state.db(),
        user.actor(),
        &identity,
        submission_id,
        payload.answers,
    )
    .await?;
    let message = match &outcome {
        SubmissionOutcome::Graded { .. } => "Submission graded",
        SubmissionOutcome::Errored { .. } => "Submission recorded with errors",
    };
    Ok(Json(ApiResponse::success(outcome, message)))
}
