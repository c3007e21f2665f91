//! Cascading deletion of servers, storage locations, profiles, runs and files.
//!
//! Disk artifacts go first, best effort: a file that cannot be removed is
//! logged and counted but never blocks the row deletion. Row deletions for
//! one run (and for one profile) are atomic in the store; a server cascade is
//! a sequence of those steps and can be retried as a whole after a failure.

use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{BackupFile, BackupProfile, BackupRun, DeletionSummary};
use crate::services::profile_scheduler::ProfileScheduler;
use crate::storage::{DiskReclaimer, ReclaimOutcome};
use crate::store::{RunFilter, Store};

/// Concurrent disk removals per run.
const RECLAIM_CONCURRENCY: usize = 8;

pub struct DeletionService {
    store: Arc<dyn Store>,
    scheduler: Arc<dyn ProfileScheduler>,
    reclaimer: DiskReclaimer,
}

impl DeletionService {
    pub fn new(
        store: Arc<dyn Store>,
        scheduler: Arc<dyn ProfileScheduler>,
        reclaimer: DiskReclaimer,
    ) -> Self {
        Self {
            store,
            scheduler,
            reclaimer,
        }
    }

    /// Delete a run with its files (disk and rows) and logs.
    pub async fn delete_run(&self, run_id: Uuid) -> Result<DeletionSummary> {
        let run = self.store.get_run(run_id).await?;
        let root = self.root_for_profile(run.backup_profile_id).await?;
        self.delete_run_with_root(&run, root).await
    }

    /// Soft-delete a single file: remove it from disk and latch `deleted`.
    ///
    /// Returns `false` when the file was already deleted.
    pub async fn delete_file(&self, file_id: Uuid) -> Result<bool> {
        let file = self.store.get_file(file_id).await?;
        if file.deleted {
            return Ok(false);
        }
        let run = self.store.get_run(file.backup_run_id).await?;
        let root = self.root_for_profile(run.backup_profile_id).await?;
        self.delete_file_with_root(&file, root.as_ref()).await?;
        Ok(true)
    }

    /// Withdraw a profile from the scheduler, delete its runs, then its
    /// commands, file rules and the profile row.
    pub async fn delete_profile(&self, profile_id: Uuid) -> Result<DeletionSummary> {
        let profile = self.store.get_profile(profile_id).await?;
        self.delete_profile_tree(&profile).await
    }

    pub async fn delete_server(&self, server_id: Uuid) -> Result<DeletionSummary> {
        self.store.get_server(server_id).await?;
        let profiles = self.store.list_profiles_for_server(server_id).await?;

        let mut summary = DeletionSummary::default();
        for profile in &profiles {
            summary.merge(&self.delete_profile_tree(profile).await?);
        }
        self.store.delete_server(server_id).await?;

        tracing::info!(
            server_id = %server_id,
            profiles = summary.backup_profiles,
            runs = summary.backup_runs,
            files = summary.backup_files,
            bytes = summary.total_size_bytes,
            disk_failures = summary.disk_failures,
            "Server deleted"
        );
        Ok(summary)
    }

    pub async fn delete_storage_location(&self, location_id: Uuid) -> Result<DeletionSummary> {
        self.store.get_storage_location(location_id).await?;
        let profiles = self
            .store
            .list_profiles_for_storage_location(location_id)
            .await?;

        let mut summary = DeletionSummary::default();
        for profile in &profiles {
            summary.merge(&self.delete_profile_tree(profile).await?);
        }
        self.store.delete_storage_location(location_id).await?;

        tracing::info!(
            location_id = %location_id,
            profiles = summary.backup_profiles,
            runs = summary.backup_runs,
            bytes = summary.total_size_bytes,
            "Storage location deleted"
        );
        Ok(summary)
    }

    /// Reclaim one file and mark it deleted even if the disk refused.
    pub(crate) async fn delete_file_with_root(
        &self,
        file: &BackupFile,
        root: Option<&PathBuf>,
    ) -> Result<ReclaimOutcome> {
        let outcome = self
            .reclaimer
            .reclaim(&file.local_path, root.map(PathBuf::as_path))
            .await;
        if let ReclaimOutcome::Failed(reason) = &outcome {
            tracing::warn!(
                file_id = %file.id,
                path = %file.local_path,
                "Disk removal failed, marking file deleted anyway: {}",
                reason
            );
        }
        self.store
            .mark_file_deleted(file.id, chrono::Utc::now())
            .await?;
        Ok(outcome)
    }

    /// Base path of the profile's storage location, if it can still be found.
    pub(crate) async fn root_for_profile(&self, profile_id: Uuid) -> Result<Option<PathBuf>> {
        let profile = match self.store.get_profile(profile_id).await {
            Ok(profile) => profile,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        match self
            .store
            .get_storage_location(profile.storage_location_id)
            .await
        {
            Ok(location) if !location.base_path.is_empty() => {
                Ok(Some(PathBuf::from(location.base_path)))
            }
            Ok(_) => Ok(None),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn delete_profile_tree(&self, profile: &BackupProfile) -> Result<DeletionSummary> {
        self.scheduler
            .unschedule_profile(profile.id)
            .await
            .map_err(|e| {
                AppError::Scheduler(format!("failed to unschedule profile {}: {}", profile.id, e))
            })?;

        let root = self.root_for_profile(profile.id).await?;
        let runs = self
            .store
            .list_runs(RunFilter::for_profile(profile.id))
            .await?;

        let mut summary = DeletionSummary::default();
        for run in &runs {
            summary.merge(&self.delete_run_with_root(run, root.clone()).await?);
        }

        let rows = self.store.delete_profile_cascade(profile.id).await?;
        summary.backup_profiles += 1;
        summary.commands += rows.commands as i64;
        summary.file_rules += rows.file_rules as i64;

        tracing::debug!(profile_id = %profile.id, runs = runs.len(), "Backup profile deleted");
        Ok(summary)
    }

    async fn delete_run_with_root(
        &self,
        run: &BackupRun,
        root: Option<PathBuf>,
    ) -> Result<DeletionSummary> {
        let files = self.store.list_files_for_run(run.id).await?;
        let live: Vec<&BackupFile> = files.iter().filter(|f| !f.deleted).collect();

        let paths: Vec<String> = live.iter().map(|f| f.local_path.clone()).collect();
        let outcomes: Vec<ReclaimOutcome> = stream::iter(paths)
            .map(|path| {
                let reclaimer = self.reclaimer.clone();
                let root = root.clone();
                async move { reclaimer.reclaim(&path, root.as_deref()).await }
            })
            .buffer_unordered(RECLAIM_CONCURRENCY)
            .collect()
            .await;
        let disk_failures = outcomes.iter().filter(|o| o.is_failure()).count() as i64;
        if disk_failures > 0 {
            tracing::warn!(
                run_id = %run.id,
                disk_failures,
                "Some backup files could not be removed from disk"
            );
        }

        let rows = self.store.delete_run_cascade(run.id).await?;

        Ok(DeletionSummary {
            backup_runs: 1,
            backup_files: rows.files as i64,
            total_size_bytes: live.iter().map(|f| f.size_bytes).sum(),
            run_logs: rows.logs as i64,
            disk_failures,
            ..Default::default()
        })
    }
}
