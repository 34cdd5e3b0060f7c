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

/// Courses are addressable by numeric id or slug in every path below.
pub fn courses_routes() -> Router<AppState> {
    Router::new()
        .route("/{identity}", delete_method(delete::remove))
        .route("/{identity}/status", put_method(put::set_status))
        .route("/{identity}/complete", post_method(post::complete))
        .route("/{identity}/enroll", post_method(post::enroll))
        .route("/{identity}/eligibility", get_method(get::eligibility))
}
