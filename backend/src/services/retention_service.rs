//! Retention sweep.
//!
//! For every profile with a positive `retention_days`, completed runs that
//! ended before `now - retention_days` lose their files (disk and `deleted`
//! latch) and are marked `retention_cleaned_up`. Run rows and logs stay.
//! A run is marked cleaned once all of its files have been attempted, so a
//! file that failed to delete is not retried by later sweeps.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::error::Result;
use crate::models::{BackupProfile, BackupRun};
use crate::services::deletion_service::DeletionService;
use crate::storage::ReclaimOutcome;
use crate::store::Store;

/// Result of one retention sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RetentionSweepResult {
    /// Profiles with retention enabled.
    pub profiles_scanned: i64,
    pub runs_cleaned: i64,
    pub files_deleted: i64,
    pub bytes_freed: i64,
    pub errors: Vec<String>,
}

pub struct RetentionService {
    store: Arc<dyn Store>,
    deletion: Arc<DeletionService>,
    sweep_lock: Mutex<()>,
}

impl RetentionService {
    pub fn new(store: Arc<dyn Store>, deletion: Arc<DeletionService>) -> Self {
        Self {
            store,
            deletion,
            sweep_lock: Mutex::new(()),
        }
    }

    pub async fn run_sweep(&self) -> Result<RetentionSweepResult> {
        self.run_sweep_at(Utc::now()).await
    }

    /// Sweep as if the current time were `now`.
    ///
    /// Only one sweep runs at a time; a second caller waits for the first.
    /// Fails only when the profile list cannot be loaded; everything after
    /// that is recorded in `errors` and the sweep carries on.
    pub async fn run_sweep_at(&self, now: DateTime<Utc>) -> Result<RetentionSweepResult> {
        let _guard = self.sweep_lock.lock().await;
        tracing::info!("Starting retention cleanup");

        let profiles = self.store.list_profiles().await?;
        let mut result = RetentionSweepResult::default();

        for profile in &profiles {
            let Some(days) = profile.retention_window() else {
                continue;
            };
            result.profiles_scanned += 1;
            // A window reaching past the representable range expires nothing.
            let Some(cutoff) = Duration::try_days(days).and_then(|d| now.checked_sub_signed(d))
            else {
                tracing::debug!(profile_id = %profile.id, days, "Retention window out of range");
                continue;
            };
            self.sweep_profile(profile, cutoff, &mut result).await;
        }

        tracing::info!(
            profiles = result.profiles_scanned,
            runs = result.runs_cleaned,
            files = result.files_deleted,
            bytes = result.bytes_freed,
            errors = result.errors.len(),
            "Retention cleanup completed"
        );
        Ok(result)
    }

    async fn sweep_profile(
        &self,
        profile: &BackupProfile,
        cutoff: DateTime<Utc>,
        result: &mut RetentionSweepResult,
    ) {
        let runs = match self
            .store
            .list_retention_candidates(profile.id, cutoff)
            .await
        {
            Ok(runs) => runs,
            Err(e) => {
                let msg = format!("Failed to find old backup runs for profile {}: {}", profile.id, e);
                tracing::warn!("{}", msg);
                result.errors.push(msg);
                return;
            }
        };
        if runs.is_empty() {
            tracing::debug!(profile_id = %profile.id, cutoff = %cutoff, "No expired backup runs");
            return;
        }

        let root = match self.deletion.root_for_profile(profile.id).await {
            Ok(root) => root,
            Err(e) => {
                let msg = format!("Failed to resolve storage root for profile {}: {}", profile.id, e);
                tracing::warn!("{}", msg);
                result.errors.push(msg);
                return;
            }
        };

        tracing::info!(
            profile_id = %profile.id,
            profile = %profile.name,
            runs = runs.len(),
            cutoff = %cutoff,
            "Cleaning up expired backup runs"
        );
        for run in &runs {
            self.sweep_run(run, root.as_ref(), result).await;
        }
    }

    async fn sweep_run(
        &self,
        run: &BackupRun,
        root: Option<&std::path::PathBuf>,
        result: &mut RetentionSweepResult,
    ) {
        let files = match self.store.list_files_for_run(run.id).await {
            Ok(files) => files,
            Err(e) => {
                let msg = format!("Failed to list files of backup run {}: {}", run.id, e);
                tracing::warn!("{}", msg);
                result.errors.push(msg);
                return;
            }
        };

        let mut deleted_files = 0i64;
        let mut deleted_bytes = 0i64;
        for file in files.iter().filter(|f| !f.deleted) {
            match self.deletion.delete_file_with_root(file, root).await {
                Ok(ReclaimOutcome::Failed(reason)) => {
                    deleted_files += 1;
                    result
                        .errors
                        .push(format!("Failed to remove {} from disk: {}", file.local_path, reason));
                }
                Ok(_) => {
                    deleted_files += 1;
                    deleted_bytes += file.size_bytes;
                }
                Err(e) => {
                    let msg = format!("Failed to delete backup file {}: {}", file.id, e);
                    tracing::warn!("{}", msg);
                    result.errors.push(msg);
                }
            }
        }

        if let Err(e) = self.store.mark_run_retention_cleaned(run.id).await {
            let msg = format!("Failed to mark backup run {} as cleaned up: {}", run.id, e);
            tracing::warn!("{}", msg);
            result.errors.push(msg);
            return;
        }

        result.runs_cleaned += 1;
        result.files_deleted += deleted_files;
        result.bytes_freed += deleted_bytes;
        tracing::info!(
            run_id = %run.id,
            files = deleted_files,
            bytes = deleted_bytes,
            "Backup run cleaned up"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::backup_profile::NewBackupProfile;
    use crate::models::backup_run::{NewBackupFile, NewBackupRun};
    use crate::models::server::NewServer;
    use crate::models::storage_location::NewStorageLocation;
    use crate::models::{BackupRunStatus, ServerAuthType};
    use crate::services::profile_scheduler::InMemoryProfileScheduler;
    use crate::storage::{DiskReclaimer, FilesystemDisk};
    use crate::store::MemoryStore;
    use uuid::Uuid;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: RetentionService,
        root: tempfile::TempDir,
        server_id: Uuid,
        location_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let root = tempfile::tempdir().unwrap();
        let deletion = Arc::new(DeletionService::new(
            store.clone(),
            Arc::new(InMemoryProfileScheduler::new()),
            DiskReclaimer::new(Arc::new(FilesystemDisk)),
        ));
        let server = store
            .insert_server(NewServer {
                name: "app".into(),
                host: "app.internal".into(),
                port: 22,
                username: "backup".into(),
                auth_type: ServerAuthType::Key,
                password: String::new(),
                private_key_path: String::new(),
            })
            .await
            .unwrap();
        let location = store
            .insert_storage_location(NewStorageLocation {
                name: "local".into(),
                base_path: root.path().to_string_lossy().into_owned(),
            })
            .await
            .unwrap();
        Fixture {
            service: RetentionService::new(store.clone(), deletion),
            store,
            root,
            server_id: server.id,
            location_id: location.id,
        }
    }

    impl Fixture {
        async fn profile(&self, retention_days: Option<i32>) -> BackupProfile {
            self.store
                .insert_profile(NewBackupProfile {
                    name: "nightly".into(),
                    server_id: self.server_id,
                    storage_location_id: self.location_id,
                    naming_rule_id: None,
                    schedule_cron: None,
                    retention_days,
                    enabled: true,
                })
                .await
                .unwrap()
        }

        async fn run(
            &self,
            profile_id: Uuid,
            status: BackupRunStatus,
            age_days: i64,
            dir: &str,
            sizes: &[i64],
        ) -> BackupRun {
            let end = Utc::now() - Duration::days(age_days);
            let run = self
                .store
                .insert_run(NewBackupRun {
                    backup_profile_id: profile_id,
                    status,
                    start_time: end - Duration::minutes(5),
                    end_time: Some(end),
                    local_backup_path: None,
                })
                .await
                .unwrap();
            for (i, size) in sizes.iter().enumerate() {
                let path = self.root.path().join(dir).join(format!("{}.dat", i));
                tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
                tokio::fs::write(&path, vec![1u8; *size as usize]).await.unwrap();
                self.store
                    .insert_file(NewBackupFile {
                        backup_run_id: run.id,
                        remote_path: format!("/var/data/{}.dat", i),
                        local_path: path.to_string_lossy().into_owned(),
                        size_bytes: *size,
                    })
                    .await
                    .unwrap();
            }
            run
        }
    }

    #[tokio::test]
    async fn test_expired_run_is_cleaned_and_kept() {
        let f = fixture().await;
        let profile = f.profile(Some(30)).await;
        let old = f.run(profile.id, BackupRunStatus::Completed, 40, "old", &[100, 200]).await;
        let recent = f.run(profile.id, BackupRunStatus::Completed, 3, "recent", &[50]).await;

        let result = f.service.run_sweep().await.unwrap();

        assert_eq!(result.profiles_scanned, 1);
        assert_eq!(result.runs_cleaned, 1);
        assert_eq!(result.files_deleted, 2);
        assert_eq!(result.bytes_freed, 300);
        assert!(result.errors.is_empty());

        let old_after = f.store.get_run(old.id).await.unwrap();
        assert!(old_after.retention_cleaned_up);
        assert!(f
            .store
            .list_files_for_run(old.id)
            .await
            .unwrap()
            .iter()
            .all(|file| file.deleted && file.deleted_at.is_some()));
        assert!(!f.root.path().join("old").exists());

        assert!(!f.store.get_run(recent.id).await.unwrap().retention_cleaned_up);
        assert!(f.root.path().join("recent/0.dat").exists());
    }

    #[tokio::test]
    async fn test_second_sweep_is_a_noop() {
        let f = fixture().await;
        let profile = f.profile(Some(7)).await;
        f.run(profile.id, BackupRunStatus::Completed, 10, "old", &[10]).await;

        f.service.run_sweep().await.unwrap();
        let second = f.service.run_sweep().await.unwrap();

        assert_eq!(second.runs_cleaned, 0);
        assert_eq!(second.files_deleted, 0);
    }

    #[tokio::test]
    async fn test_profiles_without_retention_are_skipped() {
        let f = fixture().await;
        let keep_forever = f.profile(None).await;
        let zero = f.profile(Some(0)).await;
        let a = f.run(keep_forever.id, BackupRunStatus::Completed, 400, "a", &[1]).await;
        let b = f.run(zero.id, BackupRunStatus::Completed, 400, "b", &[1]).await;

        let result = f.service.run_sweep().await.unwrap();

        assert_eq!(result.profiles_scanned, 0);
        assert!(!f.store.get_run(a.id).await.unwrap().retention_cleaned_up);
        assert!(!f.store.get_run(b.id).await.unwrap().retention_cleaned_up);
    }

    #[tokio::test]
    async fn test_unrepresentable_window_expires_nothing() {
        let f = fixture().await;
        let profile = f.profile(Some(i32::MAX)).await;
        let ancient = f.run(profile.id, BackupRunStatus::Completed, 4000, "ancient", &[1]).await;

        let result = f.service.run_sweep().await.unwrap();

        assert_eq!(result.runs_cleaned, 0);
        assert_eq!(result.files_deleted, 0);
        assert!(result.errors.is_empty());
        assert!(!f.store.get_run(ancient.id).await.unwrap().retention_cleaned_up);
        assert!(f.root.path().join("ancient").exists());
    }

    #[tokio::test]
    async fn test_failed_runs_are_never_swept() {
        let f = fixture().await;
        let profile = f.profile(Some(1)).await;
        let failed = f.run(profile.id, BackupRunStatus::Failed, 10, "failed", &[1]).await;

        let result = f.service.run_sweep().await.unwrap();

        assert_eq!(result.runs_cleaned, 0);
        assert!(!f.store.get_run(failed.id).await.unwrap().retention_cleaned_up);
    }

    #[tokio::test]
    async fn test_already_deleted_files_are_skipped() {
        let f = fixture().await;
        let profile = f.profile(Some(5)).await;
        let run = f.run(profile.id, BackupRunStatus::Completed, 9, "r", &[10, 20]).await;
        let files = f.store.list_files_for_run(run.id).await.unwrap();
        let earlier = Utc::now() - Duration::days(1);
        f.store.mark_file_deleted(files[0].id, earlier).await.unwrap();

        let result = f.service.run_sweep().await.unwrap();

        assert_eq!(result.files_deleted, 1);
        assert_eq!(result.bytes_freed, files[1].size_bytes);
        let kept = f.store.get_file(files[0].id).await.unwrap();
        assert_eq!(kept.deleted_at, Some(earlier));
    }

    #[tokio::test]
    async fn test_sweep_at_custom_now() {
        let f = fixture().await;
        let profile = f.profile(Some(30)).await;
        let run = f.run(profile.id, BackupRunStatus::Completed, 3, "r", &[1]).await;

        let result = f
            .service
            .run_sweep_at(Utc::now() + Duration::days(60))
            .await
            .unwrap();

        assert_eq!(result.runs_cleaned, 1);
        assert!(f.store.get_run(run.id).await.unwrap().retention_cleaned_up);
    }
}
