//! Storage location management.

use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::storage_location::NewStorageLocation;
use crate::models::StorageLocation;
use crate::store::Store;

/// Request body for creating or updating a storage location.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StorageLocationRequest {
    pub name: String,
    pub base_path: String,
}

impl StorageLocationRequest {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".into()));
        }
        if self.base_path.trim().is_empty() {
            return Err(AppError::Validation("base_path is required".into()));
        }
        Ok(())
    }
}

pub struct StorageLocationService {
    store: Arc<dyn Store>,
}

impl StorageLocationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<StorageLocation>> {
        self.store.list_storage_locations().await
    }

    pub async fn get(&self, id: Uuid) -> Result<StorageLocation> {
        self.store.get_storage_location(id).await
    }

    pub async fn create(&self, req: StorageLocationRequest) -> Result<StorageLocation> {
        req.validate()?;
        let location = self
            .store
            .insert_storage_location(NewStorageLocation {
                name: req.name.trim().to_string(),
                base_path: req.base_path.trim().to_string(),
            })
            .await?;
        tracing::info!(location_id = %location.id, base_path = %location.base_path, "Storage location created");
        Ok(location)
    }

    /// Rename or re-point a location. Files already written are not moved.
    pub async fn update(&self, id: Uuid, req: StorageLocationRequest) -> Result<StorageLocation> {
        req.validate()?;
        let mut location = self.store.get_storage_location(id).await?;
        location.name = req.name.trim().to_string();
        location.base_path = req.base_path.trim().to_string();
        self.store.update_storage_location(&location).await
    }
}
