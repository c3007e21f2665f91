//! In-memory store.
//!
//! Backs the test suite and local development. All tables sit behind one
//! `RwLock`, so every multi-row operation is atomic with respect to other
//! callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ProfileRowsDeleted, RunFilter, RunRowsDeleted, Store};
use crate::error::{AppError, Result};
use crate::models::backup_profile::{NewBackupProfile, NewCommand, NewFileRule};
use crate::models::backup_run::{NewBackupFile, NewBackupRun, NewBackupRunLog};
use crate::models::server::NewServer;
use crate::models::storage_location::NewStorageLocation;
use crate::models::{
    BackupFile, BackupProfile, BackupRun, BackupRunLog, Command, FileRule, Server, StorageLocation,
};

#[derive(Default)]
struct Tables {
    servers: HashMap<Uuid, Server>,
    storage_locations: HashMap<Uuid, StorageLocation>,
    profiles: HashMap<Uuid, BackupProfile>,
    commands: HashMap<Uuid, Command>,
    file_rules: HashMap<Uuid, FileRule>,
    runs: HashMap<Uuid, BackupRun>,
    files: HashMap<Uuid, BackupFile>,
    logs: HashMap<Uuid, BackupRunLog>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(what: &str) -> AppError {
    AppError::NotFound(format!("{} not found", what))
}

/// Collect matching rows, oldest first.
fn collect_sorted<T: Clone, K: Ord>(
    rows: &HashMap<Uuid, T>,
    keep: impl Fn(&T) -> bool,
    key: impl Fn(&T) -> K,
) -> Vec<T> {
    let mut out: Vec<T> = rows.values().filter(|r| keep(r)).cloned().collect();
    out.sort_by_key(|r| key(r));
    out
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    // --- servers ---

    async fn list_servers(&self) -> Result<Vec<Server>> {
        let t = self.tables.read().await;
        Ok(collect_sorted(&t.servers, |_| true, |s| (s.created_at, s.id)))
    }

    async fn get_server(&self, id: Uuid) -> Result<Server> {
        let t = self.tables.read().await;
        t.servers.get(&id).cloned().ok_or_else(|| not_found("Server"))
    }

    async fn insert_server(&self, new: NewServer) -> Result<Server> {
        let server = Server {
            id: Uuid::new_v4(),
            name: new.name,
            host: new.host,
            port: new.port,
            username: new.username,
            auth_type: new.auth_type,
            password: new.password,
            private_key_path: new.private_key_path,
            created_at: Utc::now(),
        };
        let mut t = self.tables.write().await;
        t.servers.insert(server.id, server.clone());
        Ok(server)
    }

    async fn update_server(&self, server: &Server) -> Result<Server> {
        let mut t = self.tables.write().await;
        let row = t.servers.get_mut(&server.id).ok_or_else(|| not_found("Server"))?;
        *row = Server {
            created_at: row.created_at,
            ..server.clone()
        };
        Ok(row.clone())
    }

    async fn delete_server(&self, id: Uuid) -> Result<()> {
        let mut t = self.tables.write().await;
        if t.profiles.values().any(|p| p.server_id == id) {
            return Err(AppError::Conflict(
                "Server is still referenced by backup profiles".into(),
            ));
        }
        t.servers.remove(&id).map(|_| ()).ok_or_else(|| not_found("Server"))
    }

    // --- storage locations ---

    async fn list_storage_locations(&self) -> Result<Vec<StorageLocation>> {
        let t = self.tables.read().await;
        Ok(collect_sorted(&t.storage_locations, |_| true, |l| (l.created_at, l.id)))
    }

    async fn get_storage_location(&self, id: Uuid) -> Result<StorageLocation> {
        let t = self.tables.read().await;
        t.storage_locations
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("Storage location"))
    }

    async fn insert_storage_location(&self, new: NewStorageLocation) -> Result<StorageLocation> {
        let location = StorageLocation {
            id: Uuid::new_v4(),
            name: new.name,
            base_path: new.base_path,
            created_at: Utc::now(),
        };
        let mut t = self.tables.write().await;
        t.storage_locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn update_storage_location(&self, location: &StorageLocation) -> Result<StorageLocation> {
        let mut t = self.tables.write().await;
        let row = t
            .storage_locations
            .get_mut(&location.id)
            .ok_or_else(|| not_found("Storage location"))?;
        row.name = location.name.clone();
        row.base_path = location.base_path.clone();
        Ok(row.clone())
    }

    async fn delete_storage_location(&self, id: Uuid) -> Result<()> {
        let mut t = self.tables.write().await;
        if t.profiles.values().any(|p| p.storage_location_id == id) {
            return Err(AppError::Conflict(
                "Storage location is still referenced by backup profiles".into(),
            ));
        }
        t.storage_locations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("Storage location"))
    }

    // --- profiles, commands, file rules ---

    async fn list_profiles(&self) -> Result<Vec<BackupProfile>> {
        let t = self.tables.read().await;
        Ok(collect_sorted(&t.profiles, |_| true, |p| (p.created_at, p.id)))
    }

    async fn get_profile(&self, id: Uuid) -> Result<BackupProfile> {
        let t = self.tables.read().await;
        t.profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("Backup profile"))
    }

    async fn list_profiles_for_server(&self, server_id: Uuid) -> Result<Vec<BackupProfile>> {
        let t = self.tables.read().await;
        Ok(collect_sorted(
            &t.profiles,
            |p| p.server_id == server_id,
            |p| (p.created_at, p.id),
        ))
    }

    async fn list_profiles_for_storage_location(&self, location_id: Uuid) -> Result<Vec<BackupProfile>> {
        let t = self.tables.read().await;
        Ok(collect_sorted(
            &t.profiles,
            |p| p.storage_location_id == location_id,
            |p| (p.created_at, p.id),
        ))
    }

    async fn insert_profile(&self, new: NewBackupProfile) -> Result<BackupProfile> {
        let mut t = self.tables.write().await;
        if !t.servers.contains_key(&new.server_id) {
            return Err(not_found("Server"));
        }
        if !t.storage_locations.contains_key(&new.storage_location_id) {
            return Err(not_found("Storage location"));
        }
        let profile = BackupProfile {
            id: Uuid::new_v4(),
            name: new.name,
            server_id: new.server_id,
            storage_location_id: new.storage_location_id,
            naming_rule_id: new.naming_rule_id,
            schedule_cron: new.schedule_cron,
            retention_days: new.retention_days,
            enabled: new.enabled,
            created_at: Utc::now(),
        };
        t.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn delete_profile_cascade(&self, id: Uuid) -> Result<ProfileRowsDeleted> {
        let mut t = self.tables.write().await;
        if !t.profiles.contains_key(&id) {
            return Err(not_found("Backup profile"));
        }
        if t.runs.values().any(|r| r.backup_profile_id == id) {
            return Err(AppError::Conflict(
                "Backup profile still has backup runs".into(),
            ));
        }
        let commands_before = t.commands.len();
        t.commands.retain(|_, c| c.backup_profile_id != id);
        let rules_before = t.file_rules.len();
        t.file_rules.retain(|_, r| r.backup_profile_id != id);
        t.profiles.remove(&id);
        Ok(ProfileRowsDeleted {
            commands: (commands_before - t.commands.len()) as u64,
            file_rules: (rules_before - t.file_rules.len()) as u64,
        })
    }

    async fn list_commands_for_profile(&self, profile_id: Uuid) -> Result<Vec<Command>> {
        let t = self.tables.read().await;
        Ok(collect_sorted(
            &t.commands,
            |c| c.backup_profile_id == profile_id,
            |c| (c.run_stage, c.run_order, c.created_at),
        ))
    }

    async fn insert_command(&self, new: NewCommand) -> Result<Command> {
        let mut t = self.tables.write().await;
        if !t.profiles.contains_key(&new.backup_profile_id) {
            return Err(not_found("Backup profile"));
        }
        let command = Command {
            id: Uuid::new_v4(),
            backup_profile_id: new.backup_profile_id,
            command: new.command,
            working_directory: new.working_directory,
            run_order: new.run_order,
            run_stage: new.run_stage,
            created_at: Utc::now(),
        };
        t.commands.insert(command.id, command.clone());
        Ok(command)
    }

    async fn list_file_rules_for_profile(&self, profile_id: Uuid) -> Result<Vec<FileRule>> {
        let t = self.tables.read().await;
        Ok(collect_sorted(
            &t.file_rules,
            |r| r.backup_profile_id == profile_id,
            |r| (r.created_at, r.id),
        ))
    }

    async fn insert_file_rule(&self, new: NewFileRule) -> Result<FileRule> {
        let mut t = self.tables.write().await;
        if !t.profiles.contains_key(&new.backup_profile_id) {
            return Err(not_found("Backup profile"));
        }
        let rule = FileRule {
            id: Uuid::new_v4(),
            backup_profile_id: new.backup_profile_id,
            remote_path: new.remote_path,
            recursive: new.recursive,
            exclude_pattern: new.exclude_pattern,
            created_at: Utc::now(),
        };
        t.file_rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    // --- runs ---

    async fn list_runs(&self, filter: RunFilter) -> Result<Vec<BackupRun>> {
        let t = self.tables.read().await;
        Ok(collect_sorted(
            &t.runs,
            |r| filter.accepts(r),
            |r| (r.start_time, r.id),
        ))
    }

    async fn get_run(&self, id: Uuid) -> Result<BackupRun> {
        let t = self.tables.read().await;
        t.runs.get(&id).cloned().ok_or_else(|| not_found("Backup run"))
    }

    async fn insert_run(&self, new: NewBackupRun) -> Result<BackupRun> {
        let mut t = self.tables.write().await;
        if !t.profiles.contains_key(&new.backup_profile_id) {
            return Err(not_found("Backup profile"));
        }
        let run = BackupRun {
            id: Uuid::new_v4(),
            backup_profile_id: new.backup_profile_id,
            start_time: new.start_time,
            end_time: new.end_time,
            status: new.status,
            local_backup_path: new.local_backup_path,
            total_files: 0,
            total_size_bytes: 0,
            error_message: None,
            log: None,
            retention_cleaned_up: false,
        };
        t.runs.insert(run.id, run.clone());
        Ok(run)
    }

    async fn set_run_end_time(&self, id: Uuid, end_time: DateTime<Utc>) -> Result<BackupRun> {
        let mut t = self.tables.write().await;
        let run = t.runs.get_mut(&id).ok_or_else(|| not_found("Backup run"))?;
        run.end_time = Some(end_time);
        Ok(run.clone())
    }

    async fn list_retention_candidates(
        &self,
        profile_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<BackupRun>> {
        let t = self.tables.read().await;
        Ok(collect_sorted(
            &t.runs,
            |r| r.backup_profile_id == profile_id && r.is_retention_eligible(cutoff),
            |r| (r.end_time, r.id),
        ))
    }

    async fn mark_run_retention_cleaned(&self, id: Uuid) -> Result<()> {
        let mut t = self.tables.write().await;
        let run = t.runs.get_mut(&id).ok_or_else(|| not_found("Backup run"))?;
        run.retention_cleaned_up = true;
        Ok(())
    }

    async fn delete_run_cascade(&self, id: Uuid) -> Result<RunRowsDeleted> {
        let mut t = self.tables.write().await;
        if t.runs.remove(&id).is_none() {
            return Err(not_found("Backup run"));
        }
        let logs_before = t.logs.len();
        t.logs.retain(|_, l| l.backup_run_id != id);
        let files_before = t.files.len();
        t.files.retain(|_, f| f.backup_run_id != id);
        Ok(RunRowsDeleted {
            files: (files_before - t.files.len()) as u64,
            logs: (logs_before - t.logs.len()) as u64,
        })
    }

    // --- files and logs ---

    async fn get_file(&self, id: Uuid) -> Result<BackupFile> {
        let t = self.tables.read().await;
        t.files.get(&id).cloned().ok_or_else(|| not_found("Backup file"))
    }

    async fn list_files_for_run(&self, run_id: Uuid) -> Result<Vec<BackupFile>> {
        let t = self.tables.read().await;
        Ok(collect_sorted(
            &t.files,
            |f| f.backup_run_id == run_id,
            |f| (f.created_at, f.id),
        ))
    }

    async fn insert_file(&self, new: NewBackupFile) -> Result<BackupFile> {
        let mut t = self.tables.write().await;
        let run = t
            .runs
            .get_mut(&new.backup_run_id)
            .ok_or_else(|| not_found("Backup run"))?;
        run.total_files += 1;
        run.total_size_bytes += new.size_bytes;
        let file = BackupFile {
            id: Uuid::new_v4(),
            backup_run_id: new.backup_run_id,
            remote_path: new.remote_path,
            local_path: new.local_path,
            size_bytes: new.size_bytes,
            deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
        };
        t.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn mark_file_deleted(&self, id: Uuid, at: DateTime<Utc>) -> Result<BackupFile> {
        let mut t = self.tables.write().await;
        let file = t.files.get_mut(&id).ok_or_else(|| not_found("Backup file"))?;
        file.deleted = true;
        file.deleted_at.get_or_insert(at);
        Ok(file.clone())
    }

    async fn list_logs_for_run(&self, run_id: Uuid) -> Result<Vec<BackupRunLog>> {
        let t = self.tables.read().await;
        Ok(collect_sorted(
            &t.logs,
            |l| l.backup_run_id == run_id,
            |l| (l.timestamp, l.id),
        ))
    }

    async fn append_run_log(&self, new: NewBackupRunLog) -> Result<BackupRunLog> {
        let mut t = self.tables.write().await;
        if !t.runs.contains_key(&new.backup_run_id) {
            return Err(not_found("Backup run"));
        }
        let log = BackupRunLog {
            id: Uuid::new_v4(),
            backup_run_id: new.backup_run_id,
            timestamp: Utc::now(),
            level: new.level,
            message: new.message,
        };
        t.logs.insert(log.id, log.clone());
        Ok(log)
    }
}
