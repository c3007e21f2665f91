//! Business logic services.

pub mod backup_run_service;
pub mod deletion_service;
pub mod impact_service;
pub mod profile_scheduler;
pub mod profile_service;
pub mod retention_service;
pub mod retention_task;
pub mod server_service;
pub mod storage_location_service;
