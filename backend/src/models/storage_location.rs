//! Storage location model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::path::Path;
use utoipa::ToSchema;
use uuid::Uuid;

/// A local directory tree that backup runs write into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StorageLocation {
    pub id: Uuid,
    pub name: String,
    pub base_path: String,
    pub created_at: DateTime<Utc>,
}

impl StorageLocation {
    /// Whether `path` lives inside this location's base path.
    pub fn contains(&self, path: &str) -> bool {
        is_rooted_under(path, &self.base_path)
    }
}

/// Component-wise prefix check, so `/data/backups-old` is not under `/data/backups`.
pub fn is_rooted_under(path: &str, base: &str) -> bool {
    !path.is_empty() && !base.is_empty() && Path::new(path).starts_with(Path::new(base))
}

/// Insert payload for a storage location row.
#[derive(Debug, Clone)]
pub struct NewStorageLocation {
    pub name: String,
    pub base_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_rooted_under() {
        assert!(is_rooted_under("/data/backups/web/a.tar", "/data/backups"));
        assert!(is_rooted_under("/data/backups/web/a.tar", "/data/backups/"));
        assert!(!is_rooted_under("/data/backups-old/a.tar", "/data/backups"));
        assert!(!is_rooted_under("", "/data/backups"));
        assert!(!is_rooted_under("/data/backups/a", ""));
    }
}
