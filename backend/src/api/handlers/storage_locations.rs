//! Storage location API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};
use uuid::Uuid;

use crate::api::SharedState;
use crate::error::Result;
use crate::models::{DeletionImpact, DeletionSummary, StorageLocation, StorageLocationMoveImpact};
use crate::services::storage_location_service::{StorageLocationRequest, StorageLocationService};

#[derive(OpenApi)]
#[openapi(
    paths(
        list_storage_locations,
        create_storage_location,
        get_storage_location,
        update_storage_location,
        delete_storage_location,
        storage_location_move_impact,
        storage_location_deletion_impact,
    ),
    components(schemas(
        StorageLocation,
        StorageLocationRequest,
        StorageLocationMoveImpact,
    ))
)]
pub struct StorageLocationsApiDoc;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_storage_locations).post(create_storage_location))
        .route(
            "/:id",
            get(get_storage_location)
                .put(update_storage_location)
                .delete(delete_storage_location),
        )
        .route("/:id/move-impact", get(storage_location_move_impact))
        .route("/:id/deletion-impact", get(storage_location_deletion_impact))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MoveImpactQuery {
    /// Base path the location would move to
    #[serde(default)]
    pub new_path: String,
}

/// GET /api/v1/storage-locations
#[utoipa::path(
    get,
    path = "",
    context_path = "/api/v1/storage-locations",
    tag = "storage_locations",
    operation_id = "list_storage_locations",
    responses(
        (status = 200, description = "All storage locations", body = Vec<StorageLocation>),
    ),
)]
pub async fn list_storage_locations(
    State(state): State<SharedState>,
) -> Result<Json<Vec<StorageLocation>>> {
    let locations = StorageLocationService::new(state.store.clone()).list().await?;
    Ok(Json(locations))
}

/// POST /api/v1/storage-locations
#[utoipa::path(
    post,
    path = "",
    context_path = "/api/v1/storage-locations",
    tag = "storage_locations",
    operation_id = "create_storage_location",
    request_body = StorageLocationRequest,
    responses(
        (status = 201, description = "Storage location created", body = StorageLocation),
        (status = 400, description = "Invalid input", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn create_storage_location(
    State(state): State<SharedState>,
    Json(payload): Json<StorageLocationRequest>,
) -> Result<(StatusCode, Json<StorageLocation>)> {
    let location = StorageLocationService::new(state.store.clone())
        .create(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// GET /api/v1/storage-locations/:id
#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/api/v1/storage-locations",
    tag = "storage_locations",
    operation_id = "get_storage_location",
    params(("id" = Uuid, Path, description = "Storage location ID")),
    responses(
        (status = 200, description = "Storage location", body = StorageLocation),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn get_storage_location(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StorageLocation>> {
    let location = StorageLocationService::new(state.store.clone()).get(id).await?;
    Ok(Json(location))
}

/// PUT /api/v1/storage-locations/:id
#[utoipa::path(
    put,
    path = "/{id}",
    context_path = "/api/v1/storage-locations",
    tag = "storage_locations",
    operation_id = "update_storage_location",
    params(("id" = Uuid, Path, description = "Storage location ID")),
    request_body = StorageLocationRequest,
    responses(
        (status = 200, description = "Storage location updated", body = StorageLocation),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn update_storage_location(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StorageLocationRequest>,
) -> Result<Json<StorageLocation>> {
    let location = StorageLocationService::new(state.store.clone())
        .update(id, payload)
        .await?;
    Ok(Json(location))
}

/// DELETE /api/v1/storage-locations/:id
///
/// Cascades through every profile that writes into the location.
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/api/v1/storage-locations",
    tag = "storage_locations",
    operation_id = "delete_storage_location",
    params(("id" = Uuid, Path, description = "Storage location ID")),
    responses(
        (status = 200, description = "What was removed", body = DeletionSummary),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn delete_storage_location(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletionSummary>> {
    let summary = state.deletion.delete_storage_location(id).await?;
    Ok(Json(summary))
}

/// GET /api/v1/storage-locations/:id/move-impact
#[utoipa::path(
    get,
    path = "/{id}/move-impact",
    context_path = "/api/v1/storage-locations",
    tag = "storage_locations",
    operation_id = "storage_location_move_impact",
    params(
        ("id" = Uuid, Path, description = "Storage location ID"),
        MoveImpactQuery,
    ),
    responses(
        (status = 200, description = "What a base path change would relocate", body = StorageLocationMoveImpact),
        (status = 400, description = "Missing new_path", body = crate::api::openapi::ErrorResponse),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn storage_location_move_impact(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<MoveImpactQuery>,
) -> Result<Json<StorageLocationMoveImpact>> {
    let impact = state.impact.move_impact(id, &query.new_path).await?;
    Ok(Json(impact))
}

/// GET /api/v1/storage-locations/:id/deletion-impact
#[utoipa::path(
    get,
    path = "/{id}/deletion-impact",
    context_path = "/api/v1/storage-locations",
    tag = "storage_locations",
    operation_id = "storage_location_deletion_impact",
    params(("id" = Uuid, Path, description = "Storage location ID")),
    responses(
        (status = 200, description = "What deleting the location would remove", body = DeletionImpact),
        (status = 404, description = "Not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn storage_location_deletion_impact(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletionImpact>> {
    let impact = state.impact.for_storage_location(id).await?;
    Ok(Json(impact))
}
