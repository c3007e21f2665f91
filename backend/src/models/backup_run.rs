//! Backup run history: runs, the files they produced, and their log lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Backup run status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "backup_run_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BackupRunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl std::str::FromStr for BackupRunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown backup run status '{}'", other)),
        }
    }
}

/// One execution of a backup profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BackupRun {
    pub id: Uuid,
    pub backup_profile_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: BackupRunStatus,
    pub local_backup_path: Option<String>,
    pub total_files: i32,
    pub total_size_bytes: i64,
    pub error_message: Option<String>,
    pub log: Option<String>,
    /// One-way latch set by the retention sweep.
    pub retention_cleaned_up: bool,
}

impl BackupRun {
    /// Completed, finished before `cutoff`, and not yet swept.
    pub fn is_retention_eligible(&self, cutoff: DateTime<Utc>) -> bool {
        self.status == BackupRunStatus::Completed
            && !self.retention_cleaned_up
            && self.end_time.is_some_and(|end| end < cutoff)
    }
}

/// Insert payload for a backup run row.
#[derive(Debug, Clone)]
pub struct NewBackupRun {
    pub backup_profile_id: Uuid,
    pub status: BackupRunStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub local_backup_path: Option<String>,
}

/// A file written to local storage by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BackupFile {
    pub id: Uuid,
    pub backup_run_id: Uuid,
    pub remote_path: String,
    pub local_path: String,
    pub size_bytes: i64,
    /// One-way latch; once set `local_path` no longer points at anything.
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a backup file row.
#[derive(Debug, Clone)]
pub struct NewBackupFile {
    pub backup_run_id: Uuid,
    pub remote_path: String,
    pub local_path: String,
    pub size_bytes: i64,
}

/// Append-only log line attached to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BackupRunLog {
    pub id: Uuid,
    pub backup_run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

/// Insert payload for a run log row.
#[derive(Debug, Clone)]
pub struct NewBackupRunLog {
    pub backup_run_id: Uuid,
    pub level: String,
    pub message: String,
}
