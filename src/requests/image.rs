//! `POST /v1/image` multipart form: a `path` text field and a `file` part.

use crate::{errors::AppError, services::image_service::ImageUpload, storage::ensure_relative};
use axum::extract::{Multipart, multipart::MultipartError};
use bytes::Bytes;

/// Upper bound on the stored file, 25 000 KB.
pub const MAX_IMAGE_BYTES: usize = 25_000 * 1024;
/// Body limit for the upload route: the file plus room for the form framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Extensions accepted, as detected from the file content.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "png", "webp", "gif"];

pub async fn from_multipart(mut multipart: Multipart) -> Result<ImageUpload, AppError> {
    let mut path = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("path") => path = Some(field.text().await.map_err(multipart_error)?),
            Some("file") => file = Some(field.bytes().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    let path = path.ok_or_else(|| AppError::validation("The path field is required"))?;
    let data = file.ok_or_else(|| AppError::validation("The file field is required"))?;
    validate_upload(&path, data)
}

/// Check the folder and the file content, producing the upload to store.
pub fn validate_upload(path: &str, data: Bytes) -> Result<ImageUpload, AppError> {
    let path = path.trim().trim_matches('/');
    ensure_relative(path).map_err(|err| AppError::validation(format!("The path is invalid: {err}")))?;

    if data.is_empty() {
        return Err(AppError::validation("The file must not be empty"));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::validation(
            "The file must not be greater than 25000 kilobytes",
        ));
    }

    let ext = infer::get(&data)
        .map(|kind| kind.extension())
        .filter(|ext| ALLOWED_EXTENSIONS.contains(ext))
        .ok_or_else(|| {
            AppError::validation("The file must be a file of type: jpeg, jpg, png, webp, gif")
        })?;

    Ok(ImageUpload {
        path: path.to_string(),
        ext: ext.to_string(),
        data,
    })
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::new(err.status(), err.body_text())
}
