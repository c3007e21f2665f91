//! Dry-run impact reports for destructive operations.
//!
//! Nothing here writes. The numbers are what [`DeletionService`] would remove
//! if called against the same state.
//!
//! [`DeletionService`]: crate::services::deletion_service::DeletionService

use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{BackupProfile, DeletionImpact, StorageLocationMoveImpact};
use crate::store::{RunFilter, Store};

pub struct ImpactService {
    store: Arc<dyn Store>,
}

impl ImpactService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Impact of deleting one run: its files and their bytes.
    pub async fn for_run(&self, run_id: Uuid) -> Result<DeletionImpact> {
        self.store.get_run(run_id).await?;
        let mut impact = DeletionImpact::default();
        self.accumulate_run(run_id, &mut impact).await?;
        Ok(impact)
    }

    pub async fn for_profile(&self, profile_id: Uuid) -> Result<DeletionImpact> {
        let profile = self.store.get_profile(profile_id).await?;
        let mut impact = DeletionImpact::default();
        self.accumulate_profile(&profile, &mut impact).await?;
        Ok(impact)
    }

    pub async fn for_server(&self, server_id: Uuid) -> Result<DeletionImpact> {
        self.store.get_server(server_id).await?;
        let profiles = self.store.list_profiles_for_server(server_id).await?;
        self.for_profiles(&profiles).await
    }

    /// Deleting a location cascades through every profile writing into it.
    pub async fn for_storage_location(&self, location_id: Uuid) -> Result<DeletionImpact> {
        self.store.get_storage_location(location_id).await?;
        let profiles = self
            .store
            .list_profiles_for_storage_location(location_id)
            .await?;
        self.for_profiles(&profiles).await
    }

    /// What would have to be relocated if the location's base path changed
    /// to `new_path`.
    pub async fn move_impact(
        &self,
        location_id: Uuid,
        new_path: &str,
    ) -> Result<StorageLocationMoveImpact> {
        let new_path = new_path.trim();
        if new_path.is_empty() {
            return Err(AppError::Validation("new_path is required".into()));
        }
        let location = self.store.get_storage_location(location_id).await?;
        let profiles = self
            .store
            .list_profiles_for_storage_location(location_id)
            .await?;

        let mut impact = StorageLocationMoveImpact {
            backup_profiles: profiles.len() as i64,
            old_path: location.base_path.clone(),
            new_path: new_path.to_string(),
            ..Default::default()
        };

        for profile in &profiles {
            let runs = self.store.list_runs(RunFilter::for_profile(profile.id)).await?;
            for run in &runs {
                let mut run_moves = run
                    .local_backup_path
                    .as_deref()
                    .is_some_and(|path| location.contains(path));
                for file in self.store.list_files_for_run(run.id).await? {
                    if file.deleted || !location.contains(&file.local_path) {
                        continue;
                    }
                    run_moves = true;
                    impact.backup_files += 1;
                    impact.total_size_bytes += file.size_bytes;
                    impact.files_to_move.push(file.local_path);
                }
                if run_moves {
                    impact.backup_runs += 1;
                }
            }
        }

        Ok(impact)
    }

    async fn for_profiles(&self, profiles: &[BackupProfile]) -> Result<DeletionImpact> {
        let mut impact = DeletionImpact::default();
        for profile in profiles {
            self.accumulate_profile(profile, &mut impact).await?;
        }
        Ok(impact)
    }

    async fn accumulate_profile(
        &self,
        profile: &BackupProfile,
        impact: &mut DeletionImpact,
    ) -> Result<()> {
        impact.backup_profiles += 1;
        let runs = self.store.list_runs(RunFilter::for_profile(profile.id)).await?;
        for run in runs {
            self.accumulate_run(run.id, impact).await?;
        }
        Ok(())
    }

    async fn accumulate_run(&self, run_id: Uuid, impact: &mut DeletionImpact) -> Result<()> {
        impact.backup_runs += 1;
        for file in self.store.list_files_for_run(run_id).await? {
            impact.add_file(&file);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::backup_profile::NewBackupProfile;
    use crate::models::backup_run::{NewBackupFile, NewBackupRun};
    use crate::models::server::NewServer;
    use crate::models::storage_location::NewStorageLocation;
    use crate::models::{BackupRunStatus, ServerAuthType};
    use crate::store::MemoryStore;
    use chrono::Utc;

    struct Fixture {
        store: Arc<MemoryStore>,
        server_id: Uuid,
        location_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let server = store
            .insert_server(NewServer {
                name: "app".into(),
                host: "app.internal".into(),
                port: 22,
                username: "backup".into(),
                auth_type: ServerAuthType::Key,
                password: String::new(),
                private_key_path: String::new(),
            })
            .await
            .unwrap();
        let location = store
            .insert_storage_location(NewStorageLocation {
                name: "local".into(),
                base_path: "/srv/backups".into(),
            })
            .await
            .unwrap();
        Fixture {
            store,
            server_id: server.id,
            location_id: location.id,
        }
    }

    async fn add_profile_with_run(f: &Fixture, files: &[(i64, &str)]) -> (Uuid, Uuid) {
        let profile = f
            .store
            .insert_profile(NewBackupProfile {
                name: "p".into(),
                server_id: f.server_id,
                storage_location_id: f.location_id,
                naming_rule_id: None,
                schedule_cron: None,
                retention_days: None,
                enabled: true,
            })
            .await
            .unwrap();
        let run = f
            .store
            .insert_run(NewBackupRun {
                backup_profile_id: profile.id,
                status: BackupRunStatus::Completed,
                start_time: Utc::now(),
                end_time: Some(Utc::now()),
                local_backup_path: None,
            })
            .await
            .unwrap();
        for (size, path) in files {
            f.store
                .insert_file(NewBackupFile {
                    backup_run_id: run.id,
                    remote_path: "/remote".into(),
                    local_path: path.to_string(),
                    size_bytes: *size,
                })
                .await
                .unwrap();
        }
        (profile.id, run.id)
    }

    #[tokio::test]
    async fn test_server_impact_sums_profiles() {
        let f = fixture().await;
        add_profile_with_run(&f, &[(100, "/srv/backups/a"), (200, "/srv/backups/b")]).await;
        add_profile_with_run(&f, &[(50, "/srv/backups/c")]).await;

        let impact = ImpactService::new(f.store.clone())
            .for_server(f.server_id)
            .await
            .unwrap();

        assert_eq!(impact.backup_profiles, 2);
        assert_eq!(impact.backup_runs, 2);
        assert_eq!(impact.backup_files, 3);
        assert_eq!(impact.total_size_bytes, 350);
        assert_eq!(impact.file_paths.len(), 3);
    }

    #[tokio::test]
    async fn test_soft_deleted_file_counts_without_bytes() {
        let f = fixture().await;
        let (_, run_id) =
            add_profile_with_run(&f, &[(100, "/srv/backups/a"), (200, "/srv/backups/b")]).await;
        let files = f.store.list_files_for_run(run_id).await.unwrap();
        let a = files.iter().find(|file| file.local_path == "/srv/backups/a").unwrap();
        f.store.mark_file_deleted(a.id, Utc::now()).await.unwrap();

        let impact = ImpactService::new(f.store.clone()).for_run(run_id).await.unwrap();
        assert_eq!(impact.backup_files, 2);
        assert_eq!(impact.total_size_bytes, 200);
        assert_eq!(impact.file_paths, vec!["/srv/backups/b".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_roots_are_not_found() {
        let f = fixture().await;
        let service = ImpactService::new(f.store.clone());
        assert!(service.for_server(Uuid::new_v4()).await.unwrap_err().is_not_found());
        assert!(service.for_run(Uuid::new_v4()).await.unwrap_err().is_not_found());
        assert!(service.for_profile(Uuid::new_v4()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_move_impact_lists_files_under_base_path() {
        let f = fixture().await;
        add_profile_with_run(&f, &[(10, "/srv/backups/a"), (20, "/elsewhere/b")]).await;

        let impact = ImpactService::new(f.store.clone())
            .move_impact(f.location_id, "/mnt/new")
            .await
            .unwrap();

        assert_eq!(impact.old_path, "/srv/backups");
        assert_eq!(impact.new_path, "/mnt/new");
        assert_eq!(impact.backup_profiles, 1);
        assert_eq!(impact.backup_runs, 1);
        assert_eq!(impact.backup_files, 1);
        assert_eq!(impact.total_size_bytes, 10);
        assert_eq!(impact.files_to_move, vec!["/srv/backups/a".to_string()]);
    }

    #[tokio::test]
    async fn test_move_impact_skips_runs_outside_base_path() {
        let f = fixture().await;
        add_profile_with_run(&f, &[(10, "/srv/backups/a")]).await;
        add_profile_with_run(&f, &[(20, "/elsewhere/b"), (30, "/srv/backups-old/c")]).await;

        let impact = ImpactService::new(f.store.clone())
            .move_impact(f.location_id, "/mnt/new")
            .await
            .unwrap();

        assert_eq!(impact.backup_profiles, 2);
        assert_eq!(impact.backup_runs, 1);
        assert_eq!(impact.backup_files, 1);
        assert_eq!(impact.total_size_bytes, 10);
    }

    #[tokio::test]
    async fn test_move_impact_requires_new_path() {
        let f = fixture().await;
        let err = ImpactService::new(f.store.clone())
            .move_impact(f.location_id, "")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
