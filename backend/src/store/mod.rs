//! Persistence layer.
//!
//! Services never hold a database handle directly; they receive an
//! `Arc<dyn Store>`. Lookups by id return [`AppError::NotFound`] when the row
//! is absent so callers can tell a missing target apart from a failing store.
//!
//! [`AppError::NotFound`]: crate::error::AppError::NotFound

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::backup_profile::{NewBackupProfile, NewCommand, NewFileRule};
use crate::models::backup_run::{NewBackupFile, NewBackupRun, NewBackupRunLog};
use crate::models::server::NewServer;
use crate::models::storage_location::NewStorageLocation;
use crate::models::{
    BackupFile, BackupProfile, BackupRun, BackupRunLog, BackupRunStatus, Command, FileRule, Server,
    StorageLocation,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Optional filters for listing runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFilter {
    pub profile_id: Option<Uuid>,
    pub status: Option<BackupRunStatus>,
}

impl RunFilter {
    pub fn for_profile(profile_id: Uuid) -> Self {
        Self {
            profile_id: Some(profile_id),
            status: None,
        }
    }

    pub(crate) fn accepts(&self, run: &BackupRun) -> bool {
        self.profile_id.map_or(true, |id| run.backup_profile_id == id)
            && self.status.map_or(true, |status| run.status == status)
    }
}

/// Dependent rows removed together with a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunRowsDeleted {
    pub files: u64,
    pub logs: u64,
}

/// Dependent rows removed together with a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileRowsDeleted {
    pub commands: u64,
    pub file_rules: u64,
}

/// Store trait over every entity the engine persists.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe.
    async fn ping(&self) -> Result<()>;

    // --- servers ---

    async fn list_servers(&self) -> Result<Vec<Server>>;
    async fn get_server(&self, id: Uuid) -> Result<Server>;
    async fn insert_server(&self, new: NewServer) -> Result<Server>;
    async fn update_server(&self, server: &Server) -> Result<Server>;
    /// Delete the server row only; profiles must be gone already.
    async fn delete_server(&self, id: Uuid) -> Result<()>;

    // --- storage locations ---

    async fn list_storage_locations(&self) -> Result<Vec<StorageLocation>>;
    async fn get_storage_location(&self, id: Uuid) -> Result<StorageLocation>;
    async fn insert_storage_location(&self, new: NewStorageLocation) -> Result<StorageLocation>;
    async fn update_storage_location(&self, location: &StorageLocation) -> Result<StorageLocation>;
    /// Delete the location row only; profiles must be gone already.
    async fn delete_storage_location(&self, id: Uuid) -> Result<()>;

    // --- profiles, commands, file rules ---

    async fn list_profiles(&self) -> Result<Vec<BackupProfile>>;
    async fn get_profile(&self, id: Uuid) -> Result<BackupProfile>;
    async fn list_profiles_for_server(&self, server_id: Uuid) -> Result<Vec<BackupProfile>>;
    async fn list_profiles_for_storage_location(&self, location_id: Uuid) -> Result<Vec<BackupProfile>>;
    async fn insert_profile(&self, new: NewBackupProfile) -> Result<BackupProfile>;
    /// Atomically delete the profile's commands, file rules and the profile row.
    /// Runs must be gone already.
    async fn delete_profile_cascade(&self, id: Uuid) -> Result<ProfileRowsDeleted>;

    /// Commands ordered by (stage, run order).
    async fn list_commands_for_profile(&self, profile_id: Uuid) -> Result<Vec<Command>>;
    async fn insert_command(&self, new: NewCommand) -> Result<Command>;
    async fn list_file_rules_for_profile(&self, profile_id: Uuid) -> Result<Vec<FileRule>>;
    async fn insert_file_rule(&self, new: NewFileRule) -> Result<FileRule>;

    // --- runs ---

    async fn list_runs(&self, filter: RunFilter) -> Result<Vec<BackupRun>>;
    async fn get_run(&self, id: Uuid) -> Result<BackupRun>;
    async fn insert_run(&self, new: NewBackupRun) -> Result<BackupRun>;
    async fn set_run_end_time(&self, id: Uuid, end_time: DateTime<Utc>) -> Result<BackupRun>;
    /// Completed, not yet cleaned runs of `profile_id` that ended before `cutoff`.
    async fn list_retention_candidates(
        &self,
        profile_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<BackupRun>>;
    /// Latch `retention_cleaned_up` to true.
    async fn mark_run_retention_cleaned(&self, id: Uuid) -> Result<()>;
    /// Atomically delete the run's logs, files and the run row.
    async fn delete_run_cascade(&self, id: Uuid) -> Result<RunRowsDeleted>;

    // --- files and logs ---

    async fn get_file(&self, id: Uuid) -> Result<BackupFile>;
    async fn list_files_for_run(&self, run_id: Uuid) -> Result<Vec<BackupFile>>;
    async fn insert_file(&self, new: NewBackupFile) -> Result<BackupFile>;
    /// Latch `deleted`; `deleted_at` keeps its first value.
    async fn mark_file_deleted(&self, id: Uuid, at: DateTime<Utc>) -> Result<BackupFile>;

    async fn list_logs_for_run(&self, run_id: Uuid) -> Result<Vec<BackupRunLog>>;
    async fn append_run_log(&self, new: NewBackupRunLog) -> Result<BackupRunLog>;
}
