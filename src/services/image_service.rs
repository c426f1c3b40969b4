//! ImageService: uploaded image files and their rows.
//!
//! Files land on the configured [`Disk`] under `{path}/{filename}.{ext}`.
//! The disk is not transactional: a file written before a failed insert is
//! removed again best-effort.

use super::{CatalogError, CatalogResult, is_unique_violation, item_service::remove_image_file};
use crate::{
    models::image::{self, Image},
    storage::Disk,
};
use bytes::Bytes;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const IMAGE_COLUMNS: &str =
    "SELECT id, path, filename, ext, size, created_at, updated_at FROM images";
const FILENAME_ATTEMPTS: usize = 5;

/// A validated upload, ready to store.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Logical folder, already checked to be a safe relative path.
    pub path: String,
    /// Lowercase extension without the dot.
    pub ext: String,
    pub data: Bytes,
}

#[derive(Clone)]
pub struct ImageService {
    db: Arc<SqlitePool>,
    disk: Arc<dyn Disk>,
}

impl ImageService {
    pub fn new(db: Arc<SqlitePool>, disk: Arc<dyn Disk>) -> Self {
        Self { db, disk }
    }

    pub fn disk(&self) -> &dyn Disk {
        self.disk.as_ref()
    }

    pub async fn show(&self, id: i64) -> CatalogResult<Image> {
        sqlx::query_as::<_, Image>(&format!("{IMAGE_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or(CatalogError::ImageNotFound)
    }

    /// Write the file under a fresh name, then record it.
    pub async fn store(&self, upload: ImageUpload) -> CatalogResult<Image> {
        let folder = upload.path.trim_matches('/').to_string();
        let filename = self.unused_filename(&folder, &upload.ext).await?;
        let full_path = image::full_path(&folder, &filename, &upload.ext);
        let size = upload.data.len() as i64;

        self.disk.put(&full_path, upload.data).await?;

        match self.insert(&folder, &filename, &upload.ext, size).await {
            Ok(image) => {
                info!(image_id = image.id, path = %full_path, size, disk = self.disk.name(), "image stored");
                Ok(image)
            }
            Err(err) => {
                if let Err(cleanup) = self.disk.delete(&full_path).await {
                    warn!(path = %full_path, error = %cleanup, "failed to remove orphaned upload");
                }
                Err(err)
            }
        }
    }

    /// Remove the row, then the stored file.
    ///
    /// The file is removed only after the row is committed, and failures
    /// there are logged, not returned.
    pub async fn destroy(&self, id: i64) -> CatalogResult<()> {
        let mut tx = self.db.begin().await?;

        let image = sqlx::query_as::<_, Image>(&format!("{IMAGE_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CatalogError::ImageNotFound)?;

        sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(image_id = id, path = %image.full_path(), "image deleted");

        remove_image_file(self.disk.as_ref(), &image).await;
        Ok(())
    }

    async fn insert(&self, path: &str, filename: &str, ext: &str, size: i64) -> CatalogResult<Image> {
        let mut tx = self.db.begin().await?;
        let now = Utc::now();

        let image = sqlx::query_as::<_, Image>(
            "INSERT INTO images (path, filename, ext, size, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id, path, filename, ext, size, created_at, updated_at",
        )
        .bind(path)
        .bind(filename)
        .bind(ext)
        .bind(size)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                CatalogError::Validation(format!("image `{filename}.{ext}` already exists"))
            } else {
                CatalogError::Sqlx(err)
            }
        })?;

        tx.commit().await?;
        Ok(image)
    }

    /// Draw names until one is free on the disk.
    async fn unused_filename(&self, folder: &str, ext: &str) -> CatalogResult<String> {
        for _ in 0..FILENAME_ATTEMPTS {
            let candidate = generate_filename();
            if !self.disk.exists(&image::full_path(folder, &candidate, ext)).await? {
                return Ok(candidate);
            }
        }
        Err(CatalogError::Storage(anyhow::anyhow!(
            "could not find a free filename in `{folder}` after {FILENAME_ATTEMPTS} attempts"
        )))
    }
}

/// 32 hex chars: MD5 over a random UUID and the current time.
pub fn generate_filename() -> String {
    let mut seed = Uuid::new_v4().as_bytes().to_vec();
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    seed.extend_from_slice(&nanos.to_le_bytes());
    format!("{:x}", md5::compute(seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, storage::MemoryDisk};
    use anyhow::bail;
    use async_trait::async_trait;

    /// Stores files in memory but refuses to delete them.
    struct StickyDisk(MemoryDisk);

    #[async_trait]
    impl Disk for StickyDisk {
        async fn put(&self, path: &str, data: Bytes) -> anyhow::Result<()> {
            self.0.put(path, data).await
        }

        async fn exists(&self, path: &str) -> anyhow::Result<bool> {
            self.0.exists(path).await
        }

        async fn delete(&self, path: &str) -> anyhow::Result<()> {
            bail!("read-only disk, cannot delete {path}")
        }

        fn url(&self, path: &str) -> String {
            self.0.url(path)
        }

        fn name(&self) -> &'static str {
            "sticky"
        }
    }

    async fn service(disk: Arc<dyn Disk>) -> ImageService {
        let pool = db::connect_in_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        ImageService::new(Arc::new(pool), disk)
    }

    fn png() -> ImageUpload {
        ImageUpload {
            path: "items".into(),
            ext: "png".into(),
            data: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
        }
    }

    #[tokio::test]
    async fn destroy_commits_row_removal_even_if_file_delete_fails() {
        let service = service(Arc::new(StickyDisk(MemoryDisk::new("http://h/storage")))).await;
        let image = service.store(png()).await.unwrap();

        service.destroy(image.id).await.unwrap();

        assert!(matches!(
            service.show(image.id).await,
            Err(CatalogError::ImageNotFound)
        ));
        assert!(service.disk().exists(&image.full_path()).await.unwrap());
    }

    #[tokio::test]
    async fn destroy_removes_row_and_file() {
        let service = service(Arc::new(MemoryDisk::new("http://h/storage"))).await;
        let image = service.store(png()).await.unwrap();
        assert!(service.disk().exists(&image.full_path()).await.unwrap());

        service.destroy(image.id).await.unwrap();
        assert!(!service.disk().exists(&image.full_path()).await.unwrap());
        assert!(service.destroy(image.id).await.is_err());
    }

    #[test]
    fn generated_filenames_are_hex_and_distinct() {
        let a = generate_filename();
        let b = generate_filename();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
