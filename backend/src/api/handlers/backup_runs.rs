//! Backup run and backup file API handlers.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};
use uuid::Uuid;

use crate::api::SharedState;
use crate::error::Result;
use crate::models::{
    BackupFile, BackupRun, BackupRunLog, BackupRunStatus, DeletionImpact, DeletionSummary,
};
use crate::services::backup_run_service::BackupRunService;
use crate::store::RunFilter;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_backup_runs,
        get_backup_run,
        delete_backup_run,
        list_backup_run_files,
        list_backup_run_logs,
        backup_run_deletion_impact,
        get_backup_file,
        delete_backup_file,
    ),
    components(schemas(BackupRun, BackupRunStatus, BackupFile, BackupRunLog))
)]
pub struct BackupRunsApiDoc;

pub fn runs_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_backup_runs))
        .route("/:id", get(get_backup_run).delete(delete_backup_run))
        .route("/:id/files", get(list_backup_run_files))
        .route("/:id/logs", get(list_backup_run_logs))
        .route("/:id/deletion-impact", get(backup_run_deletion_impact))
}

pub fn files_router() -> Router<SharedState> {
    Router::new().route("/:id", get(get_backup_file).delete(delete_backup_file))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRunsQuery {
    pub profile_id: Option<Uuid>,
    pub status: Option<BackupRunStatus>,
}

/// GET /api/v1/backup-runs
#[utoipa::path(
    get,
    path = "",
    context_path = "/api/v1/backup-runs",
    tag = "backup_runs",
    operation_id = "list_backup_runs",
    params(ListRunsQuery),
    responses(
        (status = 200, description = "Backup runs, oldest first", body = Vec<BackupRun>),
    ),
)]
pub async fn list_backup_runs(
    State(state): State<SharedState>,
    Query(query): Query<ListRunsQuery>,
) -> Result<Json<Vec<BackupRun>>> {
    let filter = RunFilter {
        profile_id: query.profile_id,
        status: query.status,
    };
    let runs = BackupRunService::new(state.store.clone())
        .list_runs(filter)
        .await?;
    Ok(Json(runs))
}

/// GET /api/v1/backup-runs/:id
#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/api/v1/backup-runs",
    tag = "backup_runs",
    operation_id = "get_backup_run",
    params(("id" = Uuid, Path, description = "Backup run ID")),
    responses(
        (status = 200, description = "Backup run", body = BackupRun),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn get_backup_run(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BackupRun>> {
    let run = BackupRunService::new(state.store.clone()).get_run(id).await?;
    Ok(Json(run))
}

/// DELETE /api/v1/backup-runs/:id
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/api/v1/backup-runs",
    tag = "backup_runs",
    operation_id = "delete_backup_run",
    params(("id" = Uuid, Path, description = "Backup run ID")),
    responses(
        (status = 200, description = "What was removed", body = DeletionSummary),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn delete_backup_run(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletionSummary>> {
    let summary = state.deletion.delete_run(id).await?;
    Ok(Json(summary))
}

/// GET /api/v1/backup-runs/:id/files
#[utoipa::path(
    get,
    path = "/{id}/files",
    context_path = "/api/v1/backup-runs",
    tag = "backup_runs",
    operation_id = "list_backup_run_files",
    params(("id" = Uuid, Path, description = "Backup run ID")),
    responses(
        (status = 200, description = "Files of the run, including deleted ones", body = Vec<BackupFile>),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn list_backup_run_files(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BackupFile>>> {
    let files = BackupRunService::new(state.store.clone()).list_files(id).await?;
    Ok(Json(files))
}

/// GET /api/v1/backup-runs/:id/logs
#[utoipa::path(
    get,
    path = "/{id}/logs",
    context_path = "/api/v1/backup-runs",
    tag = "backup_runs",
    operation_id = "list_backup_run_logs",
    params(("id" = Uuid, Path, description = "Backup run ID")),
    responses(
        (status = 200, description = "Run log lines", body = Vec<BackupRunLog>),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn list_backup_run_logs(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BackupRunLog>>> {
    let logs = BackupRunService::new(state.store.clone()).list_logs(id).await?;
    Ok(Json(logs))
}

/// GET /api/v1/backup-runs/:id/deletion-impact
#[utoipa::path(
    get,
    path = "/{id}/deletion-impact",
    context_path = "/api/v1/backup-runs",
    tag = "backup_runs",
    operation_id = "backup_run_deletion_impact",
    params(("id" = Uuid, Path, description = "Backup run ID")),
    responses(
        (status = 200, description = "What deleting the run would remove", body = DeletionImpact),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn backup_run_deletion_impact(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletionImpact>> {
    let impact = state.impact.for_run(id).await?;
    Ok(Json(impact))
}

/// GET /api/v1/backup-files/:id
#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/api/v1/backup-files",
    tag = "backup_runs",
    operation_id = "get_backup_file",
    params(("id" = Uuid, Path, description = "Backup file ID")),
    responses(
        (status = 200, description = "Backup file", body = BackupFile),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn get_backup_file(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BackupFile>> {
    let file = BackupRunService::new(state.store.clone()).get_file(id).await?;
    Ok(Json(file))
}

/// DELETE /api/v1/backup-files/:id
///
/// Removes the file from disk and marks it deleted; the row is kept.
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/api/v1/backup-files",
    tag = "backup_runs",
    operation_id = "delete_backup_file",
    params(("id" = Uuid, Path, description = "Backup file ID")),
    responses(
        (status = 200, description = "The file, now marked deleted", body = BackupFile),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn delete_backup_file(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BackupFile>> {
    if !state.deletion.delete_file(id).await? {
        tracing::debug!(file_id = %id, "Backup file was already deleted");
    }
    let file = BackupRunService::new(state.store.clone()).get_file(id).await?;
    Ok(Json(file))
}
