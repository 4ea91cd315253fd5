//! Authentication middleware for session cookie validation

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::{error::ApiError, models::UserId, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
}

/// Authentication middleware
///
/// Resolves the session cookie and stores the caller in the request
/// extensions. Requests without a live session never reach the handler.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar.get(&state.cookie.name).map(|cookie| cookie.value());

    let id = state.sessions.resolve(token).await.map_err(|e| {
        debug!("Rejected request to {}: {}", req.uri().path(), e);
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(AuthUser { id });

    Ok(next.run(req).await)
}
