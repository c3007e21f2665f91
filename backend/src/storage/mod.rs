//! Local disk access for backup artifacts.
//!
//! Deletion never fails because of the disk: [`DiskReclaimer::reclaim`]
//! reports what happened as a [`ReclaimOutcome`] and callers decide whether
//! to log it.

pub mod filesystem;

use async_trait::async_trait;
use std::io;
use std::path::{Component, Path};
use std::sync::Arc;
use tracing::{debug, warn};

pub use filesystem::FilesystemDisk;

/// Minimal filesystem surface used by reclamation.
#[async_trait]
pub trait Disk: Send + Sync {
    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory. Fails when the directory has entries.
    async fn remove_dir(&self, path: &Path) -> io::Result<()>;
}

/// What happened to one artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReclaimOutcome {
    /// No local path recorded; nothing to do.
    Skipped,
    Removed,
    /// The file was already gone. Counts as success.
    AlreadyAbsent,
    Failed(String),
}

impl ReclaimOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ReclaimOutcome::Failed(_))
    }
}

/// Removes backup artifacts and prunes the directories they leave empty.
#[derive(Clone)]
pub struct DiskReclaimer {
    disk: Arc<dyn Disk>,
}

impl DiskReclaimer {
    pub fn new(disk: Arc<dyn Disk>) -> Self {
        Self { disk }
    }

    /// Remove `path` and prune empty parent directories up to (but never
    /// including) `root`.
    ///
    /// Without a `root`, or when `path` does not live under it, no directory
    /// is touched.
    pub async fn reclaim(&self, path: &str, root: Option<&Path>) -> ReclaimOutcome {
        if path.is_empty() {
            return ReclaimOutcome::Skipped;
        }
        let file = Path::new(path);

        let outcome = match self.disk.remove_file(file).await {
            Ok(()) => ReclaimOutcome::Removed,
            Err(e) if e.kind() == io::ErrorKind::NotFound => ReclaimOutcome::AlreadyAbsent,
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to remove backup file");
                return ReclaimOutcome::Failed(e.to_string());
            }
        };

        if let Some(root) = root {
            self.prune_empty_parents(file, root).await;
        }
        outcome
    }

    async fn prune_empty_parents(&self, file: &Path, root: &Path) {
        if root.as_os_str().is_empty() || !file.starts_with(root) || has_parent_component(file) {
            return;
        }

        let mut current = file.parent();
        while let Some(dir) = current {
            if dir == root || !dir.starts_with(root) {
                break;
            }
            match self.disk.remove_dir(dir).await {
                Ok(()) => debug!(dir = %dir.display(), "Pruned empty directory"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                // Not empty (or not removable): everything above stays too.
                Err(_) => break,
            }
            current = dir.parent();
        }
    }
}

fn has_parent_component(path: &Path) -> bool {
    path.components().any(|c| matches!(c, Component::ParentDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn reclaimer() -> DiskReclaimer {
        DiskReclaimer::new(Arc::new(FilesystemDisk))
    }

    async fn write(path: &Path, bytes: &[u8]) {
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(path, bytes).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_path_is_skipped() {
        assert_eq!(reclaimer().reclaim("", None).await, ReclaimOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_removes_file_and_prunes_up_to_root() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("web/2024-01-01/etc/nginx.conf");
        write(&file, b"server {}").await;

        let outcome = reclaimer()
            .reclaim(file.to_str().unwrap(), Some(root.path()))
            .await;

        assert_eq!(outcome, ReclaimOutcome::Removed);
        assert!(!file.exists());
        assert!(!root.path().join("web").exists());
        assert!(root.path().exists());
    }

    #[tokio::test]
    async fn test_pruning_stops_at_non_empty_directory() {
        let root = tempfile::tempdir().unwrap();
        let doomed = root.path().join("web/run-1/a.txt");
        let sibling = root.path().join("web/run-2/b.txt");
        write(&doomed, b"a").await;
        write(&sibling, b"b").await;

        let outcome = reclaimer()
            .reclaim(doomed.to_str().unwrap(), Some(root.path()))
            .await;

        assert_eq!(outcome, ReclaimOutcome::Removed);
        assert!(!root.path().join("web/run-1").exists());
        assert!(sibling.exists());
    }

    #[tokio::test]
    async fn test_missing_file_still_prunes_empty_parent() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("web/run-1");
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let outcome = reclaimer()
            .reclaim(dir.join("gone.txt").to_str().unwrap(), Some(root.path()))
            .await;

        assert_eq!(outcome, ReclaimOutcome::AlreadyAbsent);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_no_pruning_outside_root() {
        let root = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let file = elsewhere.path().join("nested/x.bin");
        write(&file, b"x").await;

        let outcome = reclaimer()
            .reclaim(file.to_str().unwrap(), Some(root.path()))
            .await;

        assert_eq!(outcome, ReclaimOutcome::Removed);
        assert!(elsewhere.path().join("nested").exists());
    }

    #[tokio::test]
    async fn test_no_pruning_without_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested/x.bin");
        write(&file, b"x").await;

        reclaimer().reclaim(file.to_str().unwrap(), None).await;
        assert!(dir.path().join("nested").exists());
    }

    struct DenyingDisk {
        dirs_removed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Disk for DenyingDisk {
        async fn remove_file(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        async fn remove_dir(&self, path: &Path) -> io::Result<()> {
            self.dirs_removed.lock().unwrap().push(path.display().to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_nothing_pruned() {
        let disk = Arc::new(DenyingDisk {
            dirs_removed: Mutex::new(Vec::new()),
        });
        let reclaimer = DiskReclaimer::new(disk.clone());

        let outcome = reclaimer
            .reclaim("/srv/backups/web/a.txt", Some(Path::new("/srv/backups")))
            .await;

        assert!(outcome.is_failure());
        assert!(disk.dirs_removed.lock().unwrap().is_empty());
    }
}
