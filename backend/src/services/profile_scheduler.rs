//! Registry of scheduled backup profiles.
//!
//! Dispatching runs on a cron schedule is handled elsewhere; this service only
//! tracks which profiles are registered so deletion can withdraw them first.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::models::BackupProfile;

#[async_trait]
pub trait ProfileScheduler: Send + Sync {
    /// Register (or re-register) a profile under its cron expression.
    async fn schedule_profile(&self, profile: &BackupProfile) -> Result<()>;

    /// Withdraw a profile. Unknown ids are not an error.
    async fn unschedule_profile(&self, profile_id: Uuid) -> Result<()>;

    async fn is_scheduled(&self, profile_id: Uuid) -> bool;
}

/// Scheduler that keeps registrations in process memory.
#[derive(Default)]
pub struct InMemoryProfileScheduler {
    entries: RwLock<HashMap<Uuid, Option<String>>>,
}

impl InMemoryProfileScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileScheduler for InMemoryProfileScheduler {
    async fn schedule_profile(&self, profile: &BackupProfile) -> Result<()> {
        if !profile.enabled {
            self.entries.write().await.remove(&profile.id);
            return Ok(());
        }
        self.entries
            .write()
            .await
            .insert(profile.id, profile.schedule_cron.clone());
        tracing::debug!(profile_id = %profile.id, "Scheduled backup profile");
        Ok(())
    }

    async fn unschedule_profile(&self, profile_id: Uuid) -> Result<()> {
        if self.entries.write().await.remove(&profile_id).is_some() {
            tracing::debug!(profile_id = %profile_id, "Unscheduled backup profile");
        }
        Ok(())
    }

    async fn is_scheduled(&self, profile_id: Uuid) -> bool {
        self.entries.read().await.contains_key(&profile_id)
    }
}
