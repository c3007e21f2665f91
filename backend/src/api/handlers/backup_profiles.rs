//! Backup profile API handlers.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::api::SharedState;
use crate::error::Result;
use crate::models::{BackupProfile, Command, CommandStage, DeletionImpact, DeletionSummary, FileRule};
use crate::services::profile_service::ProfileService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_backup_profiles,
        get_backup_profile,
        delete_backup_profile,
        backup_profile_deletion_impact,
        list_profile_commands,
        list_profile_file_rules,
    ),
    components(schemas(BackupProfile, Command, CommandStage, FileRule))
)]
pub struct BackupProfilesApiDoc;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_backup_profiles))
        .route("/:id", get(get_backup_profile).delete(delete_backup_profile))
        .route("/:id/deletion-impact", get(backup_profile_deletion_impact))
        .route("/:id/commands", get(list_profile_commands))
        .route("/:id/file-rules", get(list_profile_file_rules))
}

/// GET /api/v1/backup-profiles
#[utoipa::path(
    get,
    path = "",
    context_path = "/api/v1/backup-profiles",
    tag = "backup_profiles",
    operation_id = "list_backup_profiles",
    responses(
        (status = 200, description = "All backup profiles", body = Vec<BackupProfile>),
    ),
)]
pub async fn list_backup_profiles(
    State(state): State<SharedState>,
) -> Result<Json<Vec<BackupProfile>>> {
    let profiles = ProfileService::new(state.store.clone()).list().await?;
    Ok(Json(profiles))
}

/// GET /api/v1/backup-profiles/:id
#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/api/v1/backup-profiles",
    tag = "backup_profiles",
    operation_id = "get_backup_profile",
    params(("id" = Uuid, Path, description = "Backup profile ID")),
    responses(
        (status = 200, description = "Backup profile", body = BackupProfile),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn get_backup_profile(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BackupProfile>> {
    let profile = ProfileService::new(state.store.clone()).get(id).await?;
    Ok(Json(profile))
}

/// DELETE /api/v1/backup-profiles/:id
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/api/v1/backup-profiles",
    tag = "backup_profiles",
    operation_id = "delete_backup_profile",
    params(("id" = Uuid, Path, description = "Backup profile ID")),
    responses(
        (status = 200, description = "What was removed", body = DeletionSummary),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn delete_backup_profile(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletionSummary>> {
    let summary = state.deletion.delete_profile(id).await?;
    Ok(Json(summary))
}

/// GET /api/v1/backup-profiles/:id/deletion-impact
#[utoipa::path(
    get,
    path = "/{id}/deletion-impact",
    context_path = "/api/v1/backup-profiles",
    tag = "backup_profiles",
    operation_id = "backup_profile_deletion_impact",
    params(("id" = Uuid, Path, description = "Backup profile ID")),
    responses(
        (status = 200, description = "What deleting the profile would remove", body = DeletionImpact),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn backup_profile_deletion_impact(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletionImpact>> {
    let impact = state.impact.for_profile(id).await?;
    Ok(Json(impact))
}

/// GET /api/v1/backup-profiles/:id/commands
#[utoipa::path(
    get,
    path = "/{id}/commands",
    context_path = "/api/v1/backup-profiles",
    tag = "backup_profiles",
    operation_id = "list_profile_commands",
    params(("id" = Uuid, Path, description = "Backup profile ID")),
    responses(
        (status = 200, description = "Commands ordered by stage then run order", body = Vec<Command>),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn list_profile_commands(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Command>>> {
    let commands = ProfileService::new(state.store.clone())
        .list_commands(id)
        .await?;
    Ok(Json(commands))
}

/// GET /api/v1/backup-profiles/:id/file-rules
#[utoipa::path(
    get,
    path = "/{id}/file-rules",
    context_path = "/api/v1/backup-profiles",
    tag = "backup_profiles",
    operation_id = "list_profile_file_rules",
    params(("id" = Uuid, Path, description = "Backup profile ID")),
    responses(
        (status = 200, description = "File rules", body = Vec<FileRule>),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn list_profile_file_rules(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FileRule>>> {
    let rules = ProfileService::new(state.store.clone())
        .list_file_rules(id)
        .await?;
    Ok(Json(rules))
}
