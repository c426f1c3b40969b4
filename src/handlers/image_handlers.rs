//! `/v1/image` handlers. Images are uploaded as multipart forms and have no
//! update operation.

use crate::{
    errors::AppError,
    requests::image,
    resources::{Data, ImageResource, Message},
    state::AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

/// `POST /v1/image`
pub async fn store(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = image::from_multipart(multipart).await?;
    let image = state.images.store(upload).await?;
    Ok((
        StatusCode::CREATED,
        Data::new(ImageResource::new(&image, state.images.disk())),
    ))
}

/// `GET /v1/image/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Data<ImageResource>, AppError> {
    let image = state.images.show(id).await?;
    Ok(Data::new(ImageResource::new(&image, state.images.disk())))
}

/// `DELETE /v1/image/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.images.destroy(id).await?;
    Ok(Message::ok("Image deleted"))
}
