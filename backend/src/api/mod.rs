//! API module - HTTP handlers and routing.

pub mod handlers;
pub mod openapi;
pub mod routes;

use std::sync::Arc;

use crate::config::Config;
use crate::services::deletion_service::DeletionService;
use crate::services::impact_service::ImpactService;
use crate::services::profile_scheduler::ProfileScheduler;
use crate::services::retention_service::RetentionService;
use crate::storage::{Disk, DiskReclaimer};
use crate::store::Store;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub scheduler: Arc<dyn ProfileScheduler>,
    pub deletion: Arc<DeletionService>,
    pub impact: Arc<ImpactService>,
    /// Shared with the background retention task so sweeps stay serialized.
    pub retention: Arc<RetentionService>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        scheduler: Arc<dyn ProfileScheduler>,
        disk: Arc<dyn Disk>,
    ) -> Self {
        let deletion = Arc::new(DeletionService::new(
            store.clone(),
            scheduler.clone(),
            DiskReclaimer::new(disk),
        ));
        Self {
            impact: Arc::new(ImpactService::new(store.clone())),
            retention: Arc::new(RetentionService::new(store.clone(), deletion.clone())),
            config,
            store,
            scheduler,
            deletion,
        }
    }
}

pub type SharedState = Arc<AppState>;
