use axum::{
    Json,
    body::Body,
    extract::FromRequestParts,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::auth::claims::AuthUser;
use crate::response::{ApiResponse, Empty};

type Rejection = (StatusCode, Json<ApiResponse<Empty>>);

fn unauthorized() -> Rejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<Empty>::error("Authentication required")),
    )
}

/// Rejects requests without a valid bearer token.
///
/// The decoded user is placed in the request extensions so downstream
/// handlers can pick it up without re-parsing the header.
pub async fn require_auth(req: Request<Body>, next: Next) -> Result<Response, Rejection> {
    let (mut parts, body) = req.into_parts();

    let user = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| unauthorized())?;

    let mut authed = Request::from_parts(parts, body);
    authed.extensions_mut().insert(user);
    Ok(next.run(authed).await)
}
