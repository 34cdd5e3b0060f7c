pub mod post;

use axum::{Router, routing::post as post_method};

use crate::state::AppState;

/// Question-set exams, addressed by id or slug.
pub fn exams_routes() -> Router<AppState> {
    Router::new()
        .route("/{identity}/start", post_method(post::start))
        .route(
            "/{identity}/submissions/{submission_id}",
            post_method(post::submit),
        )
}
