//! Impact reports for destructive operations.
//!
//! [`DeletionImpact`] is computed before a delete (dry run) and
//! [`DeletionSummary`] is what the delete actually removed. Neither is stored.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::backup_run::BackupFile;

/// What deleting a server, profile, run or storage location would destroy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeletionImpact {
    pub backup_profiles: i64,
    pub backup_runs: i64,
    pub backup_files: i64,
    pub total_size_bytes: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_paths: Vec<String>,
}

impl DeletionImpact {
    /// Account for one file row.
    ///
    /// Every row counts towards `backup_files` because deletion removes it,
    /// but a soft-deleted file has already given its bytes back, so it adds
    /// neither size nor a path.
    pub fn add_file(&mut self, file: &BackupFile) {
        self.backup_files += 1;
        if file.deleted {
            return;
        }
        self.total_size_bytes += file.size_bytes;
        if !file.local_path.is_empty() {
            self.file_paths.push(file.local_path.clone());
        }
    }
}

/// What moving a storage location's base path would have to relocate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StorageLocationMoveImpact {
    pub backup_profiles: i64,
    pub backup_runs: i64,
    pub backup_files: i64,
    pub total_size_bytes: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_to_move: Vec<String>,
    pub old_path: String,
    pub new_path: String,
}

/// Rows and bytes a cascading delete actually removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeletionSummary {
    pub backup_profiles: i64,
    pub backup_runs: i64,
    pub backup_files: i64,
    pub total_size_bytes: i64,
    pub commands: i64,
    pub file_rules: i64,
    pub run_logs: i64,
    /// Disk artifacts that could not be removed (logged, not fatal).
    pub disk_failures: i64,
}

impl DeletionSummary {
    pub fn merge(&mut self, other: &DeletionSummary) {
        self.backup_profiles += other.backup_profiles;
        self.backup_runs += other.backup_runs;
        self.backup_files += other.backup_files;
        self.total_size_bytes += other.total_size_bytes;
        self.commands += other.commands;
        self.file_rules += other.file_rules;
        self.run_logs += other.run_logs;
        self.disk_failures += other.disk_failures;
    }

    /// True when the summary covers exactly what `impact` predicted.
    pub fn matches(&self, impact: &DeletionImpact) -> bool {
        self.backup_profiles == impact.backup_profiles
            && self.backup_runs == impact.backup_runs
            && self.backup_files == impact.backup_files
            && self.total_size_bytes == impact.total_size_bytes
    }
}
