//! Storage disks for uploaded files.
//!
//! Paths handed to a disk are relative (`items/3f2c….png`); each disk maps
//! them onto its own backing store and knows how to build a public URL.

pub mod local;
pub mod memory;

pub use local::LocalDisk;
pub use memory::MemoryDisk;

use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path};

#[async_trait]
pub trait Disk: Send + Sync {
    /// Write `data` at `path`, replacing any existing file.
    async fn put(&self, path: &str, data: Bytes) -> Result<()>;

    /// Whether a file exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Remove the file at `path`. Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Public URL for the file at `path`.
    fn url(&self, path: &str) -> String;

    /// Short driver name for logs.
    fn name(&self) -> &'static str;
}

/// Reject absolute paths, traversal and control characters.
pub fn ensure_relative(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("empty storage path");
    }
    if path.bytes().any(|b| b.is_ascii_control() || b == b'\\') {
        bail!("storage path `{path}` contains forbidden characters");
    }
    for component in Path::new(path).components() {
        if !matches!(component, Component::Normal(_)) {
            bail!("storage path `{path}` must be relative and must not traverse");
        }
    }
    Ok(())
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_accepted() {
        assert!(ensure_relative("items/abc.png").is_ok());
        assert!(ensure_relative("abc.png").is_ok());
    }

    #[test]
    fn traversal_and_absolute_paths_are_rejected() {
        assert!(ensure_relative("../etc/passwd").is_err());
        assert!(ensure_relative("items/../../x").is_err());
        assert!(ensure_relative("/etc/passwd").is_err());
        assert!(ensure_relative("").is_err());
        assert!(ensure_relative("a\\b").is_err());
    }

    #[test]
    fn url_join_has_single_slash() {
        assert_eq!(join_url("http://h/storage/", "/a/b.png"), "http://h/storage/a/b.png");
    }
}
