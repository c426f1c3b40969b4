//! `/auth` handlers: login issues a bearer token, `me` and `logout` run
//! behind the token middleware.

use crate::{
    errors::AppError,
    middleware::CurrentUser,
    requests::{ValidatedJson, auth::LoginRequest},
    resources::{Data, Message, TokenResource, UserResource},
    state::AppState,
};
use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let issued = state.auth.login(&request.email, &request.password).await?;
    Ok((
        StatusCode::CREATED,
        Data::new(TokenResource {
            token: issued.token,
        }),
    ))
}

/// `POST /auth/me`
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Data<UserResource> {
    Data::new(user.into())
}

/// `POST /auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.auth.logout(user.id).await?;
    tracing::info!(user_id = user.id, removed, "user logged out");
    Ok(Message::ok("Logged out"))
}
