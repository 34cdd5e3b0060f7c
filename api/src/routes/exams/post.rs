use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use services::exam_service::{self, AnswerInput, StartedExam, SubmissionOutcome};

use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

/// POST /api/exams/{identity}/start
pub async fn start(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    user: AuthUser,
) -> Result<Json<ApiResponse<StartedExam>>, ApiError> {
    let started = exam_service::start_exam(state.db(), user.actor(), &identity).await?;
    Ok(Json(ApiResponse::success(started, "Exam started")))
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub answers: Vec<AnswerInput>,
}

/// POST /api/exams/{identity}/submissions/{submission_id}
pub async fn submit(
    State(state): State<AppState>,
    Path((identity, submission_id)): Path<(String, i64)>,
    user: AuthUser,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<ApiResponse<SubmissionOutcome>>, ApiError> {
    let outcome = exam_service::submit_answers(
        state.db(),
        state.notifier(),
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
