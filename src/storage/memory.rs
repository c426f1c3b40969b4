//! In-process disk. Files live in a map for the lifetime of the process.

use super::{Disk, ensure_relative, join_url};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryDisk {
    files: RwLock<HashMap<String, Bytes>>,
    base_url: String,
}

impl MemoryDisk {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            files: RwLock::default(),
            base_url: base_url.into(),
        }
    }

    /// Contents of a stored file, if any.
    pub async fn get(&self, path: &str) -> Option<Bytes> {
        self.files.read().await.get(path).cloned()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl Disk for MemoryDisk {
    async fn put(&self, path: &str, data: Bytes) -> Result<()> {
        ensure_relative(path)?;
        self.files.write().await.insert(path.to_string(), data);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        ensure_relative(path)?;
        Ok(self.files.read().await.contains_key(path))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        ensure_relative(path)?;
        self.files.write().await.remove(path);
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
