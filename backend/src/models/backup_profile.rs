//! Backup profile model with its commands and file rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// What to copy from which server, where to put it, when, and for how long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BackupProfile {
    pub id: Uuid,
    pub name: String,
    pub server_id: Uuid,
    pub storage_location_id: Uuid,
    pub naming_rule_id: Option<Uuid>,
    pub schedule_cron: Option<String>,
    /// `None` or a non-positive value keeps runs forever.
    pub retention_days: Option<i32>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl BackupProfile {
    /// Retention window in days, only when retention is actually enabled.
    pub fn retention_window(&self) -> Option<i64> {
        match self.retention_days {
            Some(days) if days > 0 => Some(days as i64),
            _ => None,
        }
    }
}

/// Insert payload for a backup profile row.
#[derive(Debug, Clone)]
pub struct NewBackupProfile {
    pub name: String,
    pub server_id: Uuid,
    pub storage_location_id: Uuid,
    pub naming_rule_id: Option<Uuid>,
    pub schedule_cron: Option<String>,
    pub retention_days: Option<i32>,
    pub enabled: bool,
}

/// When a command runs relative to the file transfer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "command_stage", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommandStage {
    Pre,
    Post,
}

/// Remote command executed before or after the transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Command {
    pub id: Uuid,
    pub backup_profile_id: Uuid,
    pub command: String,
    pub working_directory: String,
    pub run_order: i32,
    pub run_stage: CommandStage,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a command row.
#[derive(Debug, Clone)]
pub struct NewCommand {
    pub backup_profile_id: Uuid,
    pub command: String,
    pub working_directory: String,
    pub run_order: i32,
    pub run_stage: CommandStage,
}

/// Remote path selected for copying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FileRule {
    pub id: Uuid,
    pub backup_profile_id: Uuid,
    pub remote_path: String,
    pub recursive: bool,
    pub exclude_pattern: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a file rule row.
#[derive(Debug, Clone)]
pub struct NewFileRule {
    pub backup_profile_id: Uuid,
    pub remote_path: String,
    pub recursive: bool,
    pub exclude_pattern: Option<String>,
}
