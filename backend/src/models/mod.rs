//! Database models (SQLx).

pub mod backup_profile;
pub mod backup_run;
pub mod deletion_impact;
pub mod server;
pub mod storage_location;

pub use backup_profile::{BackupProfile, Command, CommandStage, FileRule};
pub use backup_run::{BackupFile, BackupRun, BackupRunLog, BackupRunStatus};
pub use deletion_impact::{DeletionImpact, DeletionSummary, StorageLocationMoveImpact};
pub use server::{sanitize_servers, Server, ServerAuthType};
pub use storage_location::StorageLocation;
