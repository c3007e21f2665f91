//! Read access to backup run history.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{BackupFile, BackupRun, BackupRunLog};
use crate::store::{RunFilter, Store};

pub struct BackupRunService {
    store: Arc<dyn Store>,
}

impl BackupRunService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_runs(&self, filter: RunFilter) -> Result<Vec<BackupRun>> {
        self.store.list_runs(filter).await
    }

    pub async fn get_run(&self, id: Uuid) -> Result<BackupRun> {
        self.store.get_run(id).await
    }

    /// Files of a run, including soft-deleted ones.
    pub async fn list_files(&self, run_id: Uuid) -> Result<Vec<BackupFile>> {
        self.store.get_run(run_id).await?;
        self.store.list_files_for_run(run_id).await
    }

    pub async fn get_file(&self, id: Uuid) -> Result<BackupFile> {
        self.store.get_file(id).await
    }

    pub async fn list_logs(&self, run_id: Uuid) -> Result<Vec<BackupRunLog>> {
        self.store.get_run(run_id).await?;
        self.store.list_logs_for_run(run_id).await
    }

    /// Overwrite a run's end time. Used to age runs for retention tests.
    pub async fn set_end_time(&self, run_id: Uuid, end_time: DateTime<Utc>) -> Result<BackupRun> {
        let run = self.store.set_run_end_time(run_id, end_time).await?;
        tracing::debug!(run_id = %run_id, end_time = %end_time, "Backup run end time overridden");
        Ok(run)
    }
}
