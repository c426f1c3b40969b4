pub mod auth_handlers;
pub mod health_handlers;
pub mod image_handlers;
pub mod item_handlers;
pub mod option_handlers;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Any route nothing else matched.
pub async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Endpoint not exist." })),
    )
}
