//! Defines every route of the catalog API.
//!
//! ## Structure
//! - **Public**
//!   - `GET  /healthz`, `GET /readyz`
//!   - `POST /auth/login`
//!   - `GET  /storage/{*path}` (local disk only)
//!
//! - **Bearer token required**
//!   - `POST /auth/me`, `POST /auth/logout`
//!   - `GET|POST /v1/item`, `GET|PUT|DELETE /v1/item/{id}`
//!   - `GET|POST /v1/option`, `GET|PUT|DELETE /v1/option/{id}`
//!   - `POST /v1/image`, `GET|DELETE /v1/image/{id}`
//!
//! Anything else answers 404 `{"message": "Endpoint not exist."}`.

use crate::{
    config::StorageDriver,
    handlers::{
        auth_handlers, fallback,
        health_handlers::{healthz, readyz},
        image_handlers, item_handlers, option_handlers,
    },
    middleware::require_token,
    requests::image::UPLOAD_BODY_LIMIT,
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Build the full application router around `state`.
pub fn routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", post(auth_handlers::me))
        .route("/auth/logout", post(auth_handlers::logout))
        .route(
            "/v1/item",
            get(item_handlers::index).post(item_handlers::store),
        )
        .route(
            "/v1/item/{id}",
            get(item_handlers::show)
                .put(item_handlers::update)
                .delete(item_handlers::destroy),
        )
        .route(
            "/v1/option",
            get(option_handlers::index).post(option_handlers::store),
        )
        .route(
            "/v1/option/{id}",
            get(option_handlers::show)
                .put(option_handlers::update)
                .delete(option_handlers::destroy),
        )
        .route(
            "/v1/image",
            post(image_handlers::store).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/v1/image/{id}",
            get(image_handlers::show).delete(image_handlers::destroy),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    let mut router = Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/auth/login", post(auth_handlers::login))
        .merge(protected)
        .fallback(fallback);

    if state.config.storage_driver == StorageDriver::Local {
        router = router.nest_service("/storage", ServeDir::new(&state.config.storage_dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
