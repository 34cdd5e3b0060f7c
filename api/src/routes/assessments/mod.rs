pub mod delete;
pub mod get;
pub mod post;
pub mod put;

use axum::{
    Router,
    routing::{
        delete as delete_method, get as get_method, post as post_method, put as put_method,
    },
};

use crate::state::AppState;

/// Assessments are addressable by numeric id or slug in every path below.
pub fn assessments_routes() -> Router<AppState> {
    Router::new()
        .route("/{identity}", delete_method(delete::remove))
        .route("/{identity}/status", put_method(put::set_status))
        .route("/{identity}/start", post_method(post::start))
        .route(
            "/{identity}/submissions/{submission_id}",
            post_method(post::submit),
        )
        .route("/{identity}/results", get_method(get::results))
        .route(
            "/{identity}/results/{user_id}",
            get_method(get::student_result),
        )
        .route("/{identity}/statistics", get_method(get::statistics))
        .route("/{identity}/eligibility", get_method(get::eligibility))
}
