//! Server API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::api::SharedState;
use crate::error::Result;
use crate::models::{DeletionImpact, DeletionSummary, Server, ServerAuthType};
use crate::services::server_service::{CreateServerRequest, ServerService, UpdateServerRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        list_servers,
        create_server,
        get_server,
        update_server,
        delete_server,
        server_deletion_impact,
    ),
    components(schemas(
        Server,
        ServerAuthType,
        CreateServerRequest,
        UpdateServerRequest,
        DeletionImpact,
        DeletionSummary,
    ))
)]
pub struct ServersApiDoc;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_servers).post(create_server))
        .route(
            "/:id",
            get(get_server).put(update_server).delete(delete_server),
        )
        .route("/:id/deletion-impact", get(server_deletion_impact))
}

/// GET /api/v1/servers
#[utoipa::path(
    get,
    path = "",
    context_path = "/api/v1/servers",
    tag = "servers",
    operation_id = "list_servers",
    responses(
        (status = 200, description = "Servers without credentials", body = Vec<Server>),
    ),
)]
pub async fn list_servers(State(state): State<SharedState>) -> Result<Json<Vec<Server>>> {
    let servers = ServerService::new(state.store.clone()).list().await?;
    Ok(Json(servers))
}

/// POST /api/v1/servers
#[utoipa::path(
    post,
    path = "",
    context_path = "/api/v1/servers",
    tag = "servers",
    operation_id = "create_server",
    request_body = CreateServerRequest,
    responses(
        (status = 201, description = "Server created", body = Server),
        (status = 400, description = "Invalid input", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn create_server(
    State(state): State<SharedState>,
    Json(payload): Json<CreateServerRequest>,
) -> Result<(StatusCode, Json<Server>)> {
    let server = ServerService::new(state.store.clone()).create(payload).await?;
    Ok((StatusCode::CREATED, Json(server)))
}

/// GET /api/v1/servers/:id
#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/api/v1/servers",
    tag = "servers",
    operation_id = "get_server",
    params(("id" = Uuid, Path, description = "Server ID")),
    responses(
        (status = 200, description = "Server without credentials", body = Server),
        (status = 404, description = "Server not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn get_server(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Server>> {
    let server = ServerService::new(state.store.clone()).get(id).await?;
    Ok(Json(server))
}

/// PUT /api/v1/servers/:id
#[utoipa::path(
    put,
    path = "/{id}",
    context_path = "/api/v1/servers",
    tag = "servers",
    operation_id = "update_server",
    params(("id" = Uuid, Path, description = "Server ID")),
    request_body = UpdateServerRequest,
    responses(
        (status = 200, description = "Server updated", body = Server),
        (status = 404, description = "Server not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn update_server(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServerRequest>,
) -> Result<Json<Server>> {
    let server = ServerService::new(state.store.clone())
        .update(id, payload)
        .await?;
    Ok(Json(server))
}

/// DELETE /api/v1/servers/:id
///
/// Cascades through the server's profiles, runs and files.
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/api/v1/servers",
    tag = "servers",
    operation_id = "delete_server",
    params(("id" = Uuid, Path, description = "Server ID")),
    responses(
        (status = 200, description = "What was removed", body = DeletionSummary),
        (status = 404, description = "Server not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn delete_server(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletionSummary>> {
    let summary = state.deletion.delete_server(id).await?;
    Ok(Json(summary))
}

/// GET /api/v1/servers/:id/deletion-impact
#[utoipa::path(
    get,
    path = "/{id}/deletion-impact",
    context_path = "/api/v1/servers",
    tag = "servers",
    operation_id = "server_deletion_impact",
    params(("id" = Uuid, Path, description = "Server ID")),
    responses(
        (status = 200, description = "What deleting the server would remove", body = DeletionImpact),
        (status = 404, description = "Server not found", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn server_deletion_impact(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletionImpact>> {
    let impact = state.impact.for_server(id).await?;
    Ok(Json(impact))
}
