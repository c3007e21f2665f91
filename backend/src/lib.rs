//! Backapp - Backend Library
//!
//! Backup bookkeeping for remote servers: retention sweeps, deletion impact
//! reports and cascading deletion of servers, storage locations, profiles,
//! runs and files.

#[macro_use]
mod macros;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod shutdown;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};
