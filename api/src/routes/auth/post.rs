use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use db::models::user;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::generate_jwt;
use crate::response::{ApiResponse, Empty};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: user::Model,
}

/// POST /api/auth/login
///
/// Verifies the credentials and hands back a signed JWT plus the user.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    if payload.validate().is_err() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<Empty>::error("Invalid email or password format")),
        )
            .into_response();
    }

    let found = match user::Model::find_by_email(state.db(), &payload.email).await {
        Ok(found) => found,
        Err(err) => {
            tracing::error!(error = %err, "login lookup failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error("An internal error occurred")),
            )
                .into_response();
        }
    };

    let Some(account) = found else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<Empty>::error("Invalid credentials")),
        )
            .into_response();
    };
    if !account.verify_password(&payload.password) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<Empty>::error("Invalid credentials")),
        )
            .into_response();
    }

    let (token, expires_at) = generate_jwt(account.id, account.role);
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            LoginResponse {
                token,
                expires_at,
                user: account,
            },
            "Login successful",
        )),
    )
        .into_response()
}
