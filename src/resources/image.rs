use crate::{models::image::Image, storage::Disk};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageResource {
    pub id: i64,
    pub path: String,
    pub filename: String,
    pub ext: String,
    pub url: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl ImageResource {
    pub fn new(image: &Image, disk: &dyn Disk) -> Self {
        Self {
            id: image.id,
            path: image.path.clone(),
            filename: image.filename.clone(),
            ext: image.ext.clone(),
            url: disk.url(&image.full_path()),
            created: image.created_at,
            updated: image.updated_at,
        }
    }
}
