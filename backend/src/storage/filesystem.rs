//! Filesystem disk backend.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::fs;

use super::Disk;

/// Local filesystem via `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemDisk;

#[async_trait]
impl Disk for FilesystemDisk {
    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path).await
    }

    async fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_dir_refuses_non_empty() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir(&inner).await.unwrap();
        fs::write(inner.join("f"), b"1").await.unwrap();

        let disk = FilesystemDisk;
        assert!(disk.remove_dir(&inner).await.is_err());
        assert!(inner.exists());

        disk.remove_file(&inner.join("f")).await.unwrap();
        disk.remove_dir(&inner).await.unwrap();
        assert!(!inner.exists());
    }
}
