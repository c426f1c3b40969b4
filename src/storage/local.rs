//! Filesystem-backed disk rooted at a base directory.

use super::{Disk, ensure_relative, join_url};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LocalDisk {
    base_path: PathBuf,
    base_url: String,
}

impl LocalDisk {
    pub fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.into(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        ensure_relative(path)?;
        Ok(self.base_path.join(path))
    }
}

#[async_trait]
impl Disk for LocalDisk {
    /// Writes through a temp file in the target directory, then renames, so a
    /// reader never sees a half-written image.
    async fn put(&self, path: &str, data: Bytes) -> Result<()> {
        let target = self.resolve(path)?;
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_path.clone());
        fs::create_dir_all(&parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let written = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(&data).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, &target).await
        }
        .await;

        if let Err(err) = written {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err).with_context(|| format!("writing {}", target.display()));
        }

        debug!(path = %path, size = data.len(), "file written");
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let target = self.resolve(path)?;
        Ok(fs::try_exists(&target).await?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => debug!(path = %path, "file deleted"),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path, "file already missing");
            }
            Err(err) => {
                return Err(err).with_context(|| format!("deleting {}", target.display()));
            }
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
