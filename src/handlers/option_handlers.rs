use crate::{
    errors::AppError,
    requests::{
        ValidatedJson,
        option::{self, OptionStoreRequest, OptionUpdateRequest},
    },
    resources::{Collection, Data, Message, OptionResource},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::HashMap;

pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Collection<OptionResource>, AppError> {
    let request = option::listing(&params)?;
    let listing = state.options.index(&request).await?;
    Ok(listing.map(OptionResource::from).into())
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Data<OptionResource>, AppError> {
    let option = state.options.show(id).await?;
    Ok(Data::new(option.into()))
}

pub async fn store(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<OptionStoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    let option = state.options.store(&request.abbr, &request.title).await?;
    Ok((StatusCode::CREATED, Data::new(OptionResource::from(option))))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<OptionUpdateRequest>,
) -> Result<Data<OptionResource>, AppError> {
    let option = state.options.update(id, request.into()).await?;
    Ok(Data::new(option.into()))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.options.destroy(id).await?;
    Ok(Message::ok("Option deleted"))
}
