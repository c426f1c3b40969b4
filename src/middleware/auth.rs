//! Bearer token middleware for the protected routes.
//!
//! Reads `Authorization: Bearer <token>`, resolves it to a user and stores
//! the user as [`CurrentUser`] in the request extensions. A missing header,
//! or a token that is unknown or expired, ends the request with a 401.

use crate::{errors::AppError, models::user::User, state::AppState};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

const BEARER_PREFIX: &str = "Bearer ";

/// The authenticated user of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub async fn require_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let raw_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

    let user = state.auth.authenticate(raw_token).await?;
    tracing::debug!(user_id = user.id, "bearer token accepted");

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
