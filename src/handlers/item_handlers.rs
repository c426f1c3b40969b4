//! `/v1/item` handlers.

use crate::{
    errors::AppError,
    requests::{
        ValidatedJson,
        item::{self, ItemStoreRequest, ItemUpdateRequest},
    },
    resources::{Collection, Data, ItemResource, Message},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::HashMap;

/// `GET /v1/item`
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Collection<ItemResource>, AppError> {
    let request = item::listing(&params)?;
    let listing = state.items.index(&request).await?;
    let disk = state.disk.as_ref();
    Ok(listing.map(|record| ItemResource::new(record, disk)).into())
}

/// `GET /v1/item/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Data<ItemResource>, AppError> {
    let record = state.items.show(id).await?;
    Ok(Data::new(ItemResource::new(record, state.disk.as_ref())))
}

/// `POST /v1/item`
pub async fn store(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ItemStoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.items.store(request.into_new_item()?).await?;
    Ok((
        StatusCode::CREATED,
        Data::new(ItemResource::new(record, state.disk.as_ref())),
    ))
}

/// `PUT /v1/item/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<ItemUpdateRequest>,
) -> Result<Data<ItemResource>, AppError> {
    let record = state.items.update(id, request.into_changes()?).await?;
    Ok(Data::new(ItemResource::new(record, state.disk.as_ref())))
}

/// `DELETE /v1/item/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.items.destroy(id).await?;
    Ok(Message::ok("Item deleted"))
}
