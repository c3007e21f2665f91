//! PostgreSQL store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
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

const SERVER_COLUMNS: &str =
    "id, name, host, port, username, auth_type, password, private_key_path, created_at";
const LOCATION_COLUMNS: &str = "id, name, base_path, created_at";
const PROFILE_COLUMNS: &str = "id, name, server_id, storage_location_id, naming_rule_id, \
     schedule_cron, retention_days, enabled, created_at";
const RUN_COLUMNS: &str = "id, backup_profile_id, start_time, end_time, status, local_backup_path, \
     total_files, total_size_bytes, error_message, log, retention_cleaned_up";
const FILE_COLUMNS: &str =
    "id, backup_run_id, remote_path, local_path, size_bytes, deleted, deleted_at, created_at";

/// Foreign key violation (SQLSTATE 23503).
const FK_VIOLATION: &str = "23503";

/// Map a driver error, surfacing restrict-on-delete failures as conflicts.
fn db_err(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.code().as_deref() == Some(FK_VIOLATION) {
            return AppError::Conflict(db.message().to_string());
        }
    }
    AppError::Database(e.to_string())
}

fn not_found(what: &str) -> AppError {
    AppError::NotFound(format!("{} not found", what))
}

pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // --- servers ---

    async fn list_servers(&self) -> Result<Vec<Server>> {
        sqlx::query_as::<_, Server>(&format!(
            "SELECT {} FROM servers ORDER BY created_at, id",
            SERVER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn get_server(&self, id: Uuid) -> Result<Server> {
        sqlx::query_as::<_, Server>(&format!("SELECT {} FROM servers WHERE id = $1", SERVER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| not_found("Server"))
    }

    async fn insert_server(&self, new: NewServer) -> Result<Server> {
        sqlx::query_as::<_, Server>(&format!(
            r#"
            INSERT INTO servers (id, name, host, port, username, auth_type, password, private_key_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SERVER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.host)
        .bind(new.port)
        .bind(&new.username)
        .bind(new.auth_type)
        .bind(&new.password)
        .bind(&new.private_key_path)
        .fetch_one(&self.db)
        .await
        .map_err(db_err)
    }

    async fn update_server(&self, server: &Server) -> Result<Server> {
        sqlx::query_as::<_, Server>(&format!(
            r#"
            UPDATE servers
            SET name = $2, host = $3, port = $4, username = $5, auth_type = $6,
                password = $7, private_key_path = $8
            WHERE id = $1
            RETURNING {}
            "#,
            SERVER_COLUMNS
        ))
        .bind(server.id)
        .bind(&server.name)
        .bind(&server.host)
        .bind(server.port)
        .bind(&server.username)
        .bind(server.auth_type)
        .bind(&server.password)
        .bind(&server.private_key_path)
        .fetch_optional(&self.db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| not_found("Server"))
    }

    async fn delete_server(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM servers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(not_found("Server"));
        }
        Ok(())
    }

    // --- storage locations ---

    async fn list_storage_locations(&self) -> Result<Vec<StorageLocation>> {
        sqlx::query_as::<_, StorageLocation>(&format!(
            "SELECT {} FROM storage_locations ORDER BY created_at, id",
            LOCATION_COLUMNS
        ))
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn get_storage_location(&self, id: Uuid) -> Result<StorageLocation> {
        sqlx::query_as::<_, StorageLocation>(&format!(
            "SELECT {} FROM storage_locations WHERE id = $1",
            LOCATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| not_found("Storage location"))
    }

    async fn insert_storage_location(&self, new: NewStorageLocation) -> Result<StorageLocation> {
        sqlx::query_as::<_, StorageLocation>(&format!(
            "INSERT INTO storage_locations (id, name, base_path) VALUES ($1, $2, $3) RETURNING {}",
            LOCATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.base_path)
        .fetch_one(&self.db)
        .await
        .map_err(db_err)
    }

    async fn update_storage_location(&self, location: &StorageLocation) -> Result<StorageLocation> {
        sqlx::query_as::<_, StorageLocation>(&format!(
            "UPDATE storage_locations SET name = $2, base_path = $3 WHERE id = $1 RETURNING {}",
            LOCATION_COLUMNS
        ))
        .bind(location.id)
        .bind(&location.name)
        .bind(&location.base_path)
        .fetch_optional(&self.db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| not_found("Storage location"))
    }

    async fn delete_storage_location(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM storage_locations WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(not_found("Storage location"));
        }
        Ok(())
    }

    // --- profiles, commands, file rules ---

    async fn list_profiles(&self) -> Result<Vec<BackupProfile>> {
        sqlx::query_as::<_, BackupProfile>(&format!(
            "SELECT {} FROM backup_profiles ORDER BY created_at, id",
            PROFILE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn get_profile(&self, id: Uuid) -> Result<BackupProfile> {
        sqlx::query_as::<_, BackupProfile>(&format!(
            "SELECT {} FROM backup_profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| not_found("Backup profile"))
    }

    async fn list_profiles_for_server(&self, server_id: Uuid) -> Result<Vec<BackupProfile>> {
        sqlx::query_as::<_, BackupProfile>(&format!(
            "SELECT {} FROM backup_profiles WHERE server_id = $1 ORDER BY created_at, id",
            PROFILE_COLUMNS
        ))
        .bind(server_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn list_profiles_for_storage_location(&self, location_id: Uuid) -> Result<Vec<BackupProfile>> {
        sqlx::query_as::<_, BackupProfile>(&format!(
            "SELECT {} FROM backup_profiles WHERE storage_location_id = $1 ORDER BY created_at, id",
            PROFILE_COLUMNS
        ))
        .bind(location_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn insert_profile(&self, new: NewBackupProfile) -> Result<BackupProfile> {
        sqlx::query_as::<_, BackupProfile>(&format!(
            r#"
            INSERT INTO backup_profiles
                (id, name, server_id, storage_location_id, naming_rule_id,
                 schedule_cron, retention_days, enabled)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(new.server_id)
        .bind(new.storage_location_id)
        .bind(new.naming_rule_id)
        .bind(&new.schedule_cron)
        .bind(new.retention_days)
        .bind(new.enabled)
        .fetch_one(&self.db)
        .await
        .map_err(db_err)
    }

    async fn delete_profile_cascade(&self, id: Uuid) -> Result<ProfileRowsDeleted> {
        let mut tx = self.db.begin().await.map_err(db_err)?;

        let commands = sqlx::query("DELETE FROM commands WHERE backup_profile_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?
            .rows_affected();

        let file_rules = sqlx::query("DELETE FROM file_rules WHERE backup_profile_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?
            .rows_affected();

        let profiles = sqlx::query("DELETE FROM backup_profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?
            .rows_affected();

        if profiles == 0 {
            tx.rollback().await.map_err(db_err)?;
            return Err(not_found("Backup profile"));
        }

        tx.commit().await.map_err(db_err)?;
        Ok(ProfileRowsDeleted {
            commands,
            file_rules,
        })
    }

    async fn list_commands_for_profile(&self, profile_id: Uuid) -> Result<Vec<Command>> {
        sqlx::query_as::<_, Command>(
            r#"
            SELECT id, backup_profile_id, command, working_directory, run_order, run_stage, created_at
            FROM commands
            WHERE backup_profile_id = $1
            ORDER BY run_stage, run_order, created_at
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn insert_command(&self, new: NewCommand) -> Result<Command> {
        sqlx::query_as::<_, Command>(
            r#"
            INSERT INTO commands (id, backup_profile_id, command, working_directory, run_order, run_stage)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, backup_profile_id, command, working_directory, run_order, run_stage, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.backup_profile_id)
        .bind(&new.command)
        .bind(&new.working_directory)
        .bind(new.run_order)
        .bind(new.run_stage)
        .fetch_one(&self.db)
        .await
        .map_err(db_err)
    }

    async fn list_file_rules_for_profile(&self, profile_id: Uuid) -> Result<Vec<FileRule>> {
        sqlx::query_as::<_, FileRule>(
            r#"
            SELECT id, backup_profile_id, remote_path, recursive, exclude_pattern, created_at
            FROM file_rules
            WHERE backup_profile_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn insert_file_rule(&self, new: NewFileRule) -> Result<FileRule> {
        sqlx::query_as::<_, FileRule>(
            r#"
            INSERT INTO file_rules (id, backup_profile_id, remote_path, recursive, exclude_pattern)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, backup_profile_id, remote_path, recursive, exclude_pattern, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.backup_profile_id)
        .bind(&new.remote_path)
        .bind(new.recursive)
        .bind(&new.exclude_pattern)
        .fetch_one(&self.db)
        .await
        .map_err(db_err)
    }

    // --- runs ---

    async fn list_runs(&self, filter: RunFilter) -> Result<Vec<BackupRun>> {
        sqlx::query_as::<_, BackupRun>(&format!(
            r#"
            SELECT {}
            FROM backup_runs
            WHERE ($1::uuid IS NULL OR backup_profile_id = $1)
              AND ($2::backup_run_status IS NULL OR status = $2)
            ORDER BY start_time, id
            "#,
            RUN_COLUMNS
        ))
        .bind(filter.profile_id)
        .bind(filter.status)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn get_run(&self, id: Uuid) -> Result<BackupRun> {
        sqlx::query_as::<_, BackupRun>(&format!(
            "SELECT {} FROM backup_runs WHERE id = $1",
            RUN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| not_found("Backup run"))
    }

    async fn insert_run(&self, new: NewBackupRun) -> Result<BackupRun> {
        sqlx::query_as::<_, BackupRun>(&format!(
            r#"
            INSERT INTO backup_runs (id, backup_profile_id, start_time, end_time, status, local_backup_path)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            RUN_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new.backup_profile_id)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(new.status)
        .bind(&new.local_backup_path)
        .fetch_one(&self.db)
        .await
        .map_err(db_err)
    }

    async fn set_run_end_time(&self, id: Uuid, end_time: DateTime<Utc>) -> Result<BackupRun> {
        sqlx::query_as::<_, BackupRun>(&format!(
            "UPDATE backup_runs SET end_time = $2 WHERE id = $1 RETURNING {}",
            RUN_COLUMNS
        ))
        .bind(id)
        .bind(end_time)
        .fetch_optional(&self.db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| not_found("Backup run"))
    }

    async fn list_retention_candidates(
        &self,
        profile_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<BackupRun>> {
        sqlx::query_as::<_, BackupRun>(&format!(
            r#"
            SELECT {}
            FROM backup_runs
            WHERE backup_profile_id = $1
              AND end_time < $2
              AND status = 'completed'
              AND retention_cleaned_up = false
            ORDER BY end_time, id
            "#,
            RUN_COLUMNS
        ))
        .bind(profile_id)
        .bind(cutoff)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn mark_run_retention_cleaned(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE backup_runs SET retention_cleaned_up = true WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(not_found("Backup run"));
        }
        Ok(())
    }

    async fn delete_run_cascade(&self, id: Uuid) -> Result<RunRowsDeleted> {
        let mut tx = self.db.begin().await.map_err(db_err)?;

        let logs = sqlx::query("DELETE FROM backup_run_logs WHERE backup_run_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?
            .rows_affected();

        let files = sqlx::query("DELETE FROM backup_files WHERE backup_run_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?
            .rows_affected();

        let runs = sqlx::query("DELETE FROM backup_runs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?
            .rows_affected();

        if runs == 0 {
            tx.rollback().await.map_err(db_err)?;
            return Err(not_found("Backup run"));
        }

        tx.commit().await.map_err(db_err)?;
        Ok(RunRowsDeleted { files, logs })
    }

    // --- files and logs ---

    async fn get_file(&self, id: Uuid) -> Result<BackupFile> {
        sqlx::query_as::<_, BackupFile>(&format!(
            "SELECT {} FROM backup_files WHERE id = $1",
            FILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| not_found("Backup file"))
    }

    async fn list_files_for_run(&self, run_id: Uuid) -> Result<Vec<BackupFile>> {
        sqlx::query_as::<_, BackupFile>(&format!(
            "SELECT {} FROM backup_files WHERE backup_run_id = $1 ORDER BY created_at, id",
            FILE_COLUMNS
        ))
        .bind(run_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn insert_file(&self, new: NewBackupFile) -> Result<BackupFile> {
        let mut tx = self.db.begin().await.map_err(db_err)?;

        let file = sqlx::query_as::<_, BackupFile>(&format!(
            r#"
            INSERT INTO backup_files (id, backup_run_id, remote_path, local_path, size_bytes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new.backup_run_id)
        .bind(&new.remote_path)
        .bind(&new.local_path)
        .bind(new.size_bytes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match db_err(e) {
            AppError::Conflict(_) => not_found("Backup run"),
            other => other,
        })?;

        sqlx::query(
            r#"
            UPDATE backup_runs
            SET total_files = total_files + 1, total_size_bytes = total_size_bytes + $2
            WHERE id = $1
            "#,
        )
        .bind(new.backup_run_id)
        .bind(new.size_bytes)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(file)
    }

    async fn mark_file_deleted(&self, id: Uuid, at: DateTime<Utc>) -> Result<BackupFile> {
        sqlx::query_as::<_, BackupFile>(&format!(
            r#"
            UPDATE backup_files
            SET deleted = true, deleted_at = COALESCE(deleted_at, $2)
            WHERE id = $1
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(&self.db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| not_found("Backup file"))
    }

    async fn list_logs_for_run(&self, run_id: Uuid) -> Result<Vec<BackupRunLog>> {
        sqlx::query_as::<_, BackupRunLog>(
            r#"
            SELECT id, backup_run_id, timestamp, level, message
            FROM backup_run_logs
            WHERE backup_run_id = $1
            ORDER BY timestamp, id
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_err)
    }

    async fn append_run_log(&self, new: NewBackupRunLog) -> Result<BackupRunLog> {
        sqlx::query_as::<_, BackupRunLog>(
            r#"
            INSERT INTO backup_run_logs (id, backup_run_id, level, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, backup_run_id, timestamp, level, message
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.backup_run_id)
        .bind(&new.level)
        .bind(&new.message)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match db_err(e) {
            AppError::Conflict(_) => not_found("Backup run"),
            other => other,
        })
    }
}
