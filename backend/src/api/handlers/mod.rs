//! HTTP request handlers.

pub mod admin;
pub mod backup_profiles;
pub mod backup_runs;
pub mod health;
pub mod servers;
pub mod storage_locations;
