//! Data factories for servers, storage locations, profiles and runs.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use backapp_backend::models::backup_profile::{NewBackupProfile, NewCommand, NewFileRule};
use backapp_backend::models::backup_run::{NewBackupFile, NewBackupRun, NewBackupRunLog};
use backapp_backend::models::server::NewServer;
use backapp_backend::models::storage_location::NewStorageLocation;
use backapp_backend::models::{
    BackupFile, BackupProfile, BackupRun, BackupRunStatus, CommandStage, Server, ServerAuthType,
    StorageLocation,
};
use backapp_backend::services::profile_scheduler::ProfileScheduler;
use backapp_backend::store::Store;

use super::TestContext;

impl TestContext {
    pub async fn server(&self, name: &str) -> Server {
        self.store
            .insert_server(NewServer {
                name: name.to_string(),
                host: format!("{}.internal", name),
                port: 22,
                username: "backup".to_string(),
                auth_type: ServerAuthType::Password,
                password: "s3cret-pass".to_string(),
                private_key_path: "/keys/id_ed25519".to_string(),
            })
            .await
            .expect("insert server")
    }

    /// A storage location rooted at the context's temp directory.
    pub async fn location(&self) -> StorageLocation {
        self.store
            .insert_storage_location(NewStorageLocation {
                name: "local".to_string(),
                base_path: self.root_path().to_string_lossy().into_owned(),
            })
            .await
            .expect("insert storage location")
    }

    pub async fn profile(
        &self,
        server: &Server,
        location: &StorageLocation,
        retention_days: Option<i32>,
    ) -> BackupProfile {
        let profile = self
            .store
            .insert_profile(NewBackupProfile {
                name: format!("{}-nightly", server.name),
                server_id: server.id,
                storage_location_id: location.id,
                naming_rule_id: None,
                schedule_cron: Some("0 3 * * *".to_string()),
                retention_days,
                enabled: true,
            })
            .await
            .expect("insert profile");
        self.store
            .insert_command(NewCommand {
                backup_profile_id: profile.id,
                command: "systemctl stop app".to_string(),
                working_directory: String::new(),
                run_order: 1,
                run_stage: CommandStage::Pre,
            })
            .await
            .expect("insert command");
        self.store
            .insert_file_rule(NewFileRule {
                backup_profile_id: profile.id,
                remote_path: "/var/lib/app".to_string(),
                recursive: true,
                exclude_pattern: Some("*.tmp".to_string()),
            })
            .await
            .expect("insert file rule");
        self.scheduler
            .schedule_profile(&profile)
            .await
            .expect("schedule profile");
        profile
    }

    /// A completed run that ended `age_days` ago, with one real file on disk
    /// per entry in `sizes` under `<root>/<dir>/`.
    pub async fn completed_run(
        &self,
        profile: &BackupProfile,
        age_days: i64,
        dir: &str,
        sizes: &[i64],
    ) -> (BackupRun, Vec<BackupFile>) {
        let end: DateTime<Utc> = Utc::now() - Duration::days(age_days);
        let run = self
            .store
            .insert_run(NewBackupRun {
                backup_profile_id: profile.id,
                status: BackupRunStatus::Completed,
                start_time: end - Duration::minutes(10),
                end_time: Some(end),
                local_backup_path: Some(self.path_in_root(dir).to_string_lossy().into_owned()),
            })
            .await
            .expect("insert run");

        let mut files = Vec::new();
        for (i, size) in sizes.iter().enumerate() {
            let path = self.path_in_root(dir).join(format!("var/lib/app/part-{}.bin", i));
            tokio::fs::create_dir_all(path.parent().expect("parent"))
                .await
                .expect("create run dir");
            tokio::fs::write(&path, vec![0u8; *size as usize])
                .await
                .expect("write backup file");
            let file = self
                .store
                .insert_file(NewBackupFile {
                    backup_run_id: run.id,
                    remote_path: format!("/var/lib/app/part-{}.bin", i),
                    local_path: path.to_string_lossy().into_owned(),
                    size_bytes: *size,
                })
                .await
                .expect("insert file");
            files.push(file);
        }

        self.store
            .append_run_log(NewBackupRunLog {
                backup_run_id: run.id,
                level: "INFO".to_string(),
                message: format!("copied {} files", sizes.len()),
            })
            .await
            .expect("append log");

        (run, files)
    }
}

pub fn random_id() -> Uuid {
    Uuid::new_v4()
}
