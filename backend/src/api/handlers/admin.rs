//! Test-only endpoints: manual retention trigger and run end time override.
//!
//! Mounted only when `ENABLE_TEST_ENDPOINTS` is set.

use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::api::SharedState;
use crate::error::Result;
use crate::models::BackupRun;
use crate::services::backup_run_service::BackupRunService;
use crate::services::retention_service::RetentionSweepResult;

#[derive(OpenApi)]
#[openapi(
    paths(trigger_retention_cleanup, set_backup_run_end_time),
    components(schemas(RetentionSweepResult, SetEndTimeRequest))
)]
pub struct AdminApiDoc;

pub fn test_router() -> Router<SharedState> {
    Router::new()
        .route("/retention-cleanup", post(trigger_retention_cleanup))
        .route("/backup-runs/:id/end-time", put(set_backup_run_end_time))
}

/// Request body for overriding a run's end time.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetEndTimeRequest {
    /// RFC 3339 timestamp
    pub end_time: DateTime<Utc>,
}

/// POST /api/v1/test/retention-cleanup
#[utoipa::path(
    post,
    path = "/retention-cleanup",
    context_path = "/api/v1/test",
    tag = "test",
    operation_id = "trigger_retention_cleanup",
    responses(
        (status = 200, description = "Sweep result", body = RetentionSweepResult),
    ),
)]
pub async fn trigger_retention_cleanup(
    State(state): State<SharedState>,
) -> Result<Json<RetentionSweepResult>> {
    let result = state.retention.run_sweep().await?;
    Ok(Json(result))
}

/// PUT /api/v1/test/backup-runs/:id/end-time
#[utoipa::path(
    put,
    path = "/backup-runs/{id}/end-time",
    context_path = "/api/v1/test",
    tag = "test",
    operation_id = "set_backup_run_end_time",
    params(("id" = Uuid, Path, description = "Backup run ID")),
    request_body = SetEndTimeRequest,
    responses(
        (status = 200, description = "Updated run", body = BackupRun),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn set_backup_run_end_time(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetEndTimeRequest>,
) -> Result<Json<BackupRun>> {
    let run = BackupRunService::new(state.store.clone())
        .set_end_time(id, payload.end_time)
        .await?;
    Ok(Json(run))
}
