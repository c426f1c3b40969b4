//! Uploaded images. The row stores where the file lives on the disk; the
//! bytes themselves are owned by the configured `Disk`.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Clone, FromRow, Debug, PartialEq)]
pub struct Image {
    pub id: i64,
    /// Logical folder the file was uploaded into.
    pub path: String,
    /// Generated name, without extension.
    pub filename: String,
    pub ext: String,
    /// Size in bytes.
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Image {
    /// Disk-relative location: `{path}/{filename}.{ext}`.
    pub fn full_path(&self) -> String {
        full_path(&self.path, &self.filename, &self.ext)
    }
}

pub fn full_path(path: &str, filename: &str, ext: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        format!("{filename}.{ext}")
    } else {
        format!("{path}/{filename}.{ext}")
    }
}

/// An image row joined with the item it is attached to.
#[derive(Clone, FromRow, Debug, PartialEq)]
pub struct AttachedImage {
    pub item_id: i64,
    pub id: i64,
    pub path: String,
    pub filename: String,
    pub ext: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AttachedImage> for Image {
    fn from(row: AttachedImage) -> Self {
        Self {
            id: row.id,
            path: row.path,
            filename: row.filename,
            ext: row.ext,
            size: row.size,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
