pub mod post;

use axum::{Router, routing::post as post_method};

use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post_method(post::login))
}
