//! Read access to backup profiles and their commands and file rules.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{BackupProfile, Command, FileRule};
use crate::store::Store;

pub struct ProfileService {
    store: Arc<dyn Store>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<BackupProfile>> {
        self.store.list_profiles().await
    }

    pub async fn get(&self, id: Uuid) -> Result<BackupProfile> {
        self.store.get_profile(id).await
    }

    /// Pre-stage commands first, each stage by run order.
    pub async fn list_commands(&self, profile_id: Uuid) -> Result<Vec<Command>> {
        self.store.get_profile(profile_id).await?;
        self.store.list_commands_for_profile(profile_id).await
    }

    pub async fn list_file_rules(&self, profile_id: Uuid) -> Result<Vec<FileRule>> {
        self.store.get_profile(profile_id).await?;
        self.store.list_file_rules_for_profile(profile_id).await
    }
}
