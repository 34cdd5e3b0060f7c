//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → liveness check (public)
//! - `/auth` → login (public)
//! - `/assessments` → status changes, attempts, results, eligibility
//! - `/courses` → status changes, enrollment, completion, eligibility
//! - `/exams` → question-set attempts reached through course lessons

use axum::{Router, middleware::from_fn};

use crate::auth::guards::require_auth;
use crate::routes::{
    assessments::assessments_routes, auth::auth_routes, courses::courses_routes,
    exams::exams_routes, health::health_routes,
};
use crate::state::AppState;

pub mod assessments;
pub mod auth;
pub mod courses;
pub mod exams;
pub mod health;

/// Builds the complete application router for all HTTP endpoints.
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest(
            "/assessments",
            assessments_routes().route_layer(from_fn(require_auth)),
        )
        .nest(
            "/courses",
            courses_routes().route_layer(from_fn(require_auth)),
        )
        .nest(
            "/exams",
            exams_routes().route_layer(from_fn(require_auth)),
        )
        .with_state(app_state)
}
