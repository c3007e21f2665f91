//! OpenAPI specification generated from handler annotations via utoipa.

use utoipa::OpenApi;

/// Top-level OpenAPI document for the backup API.
///
/// Each handler module contributes its own paths and schemas via per-module
/// `#[derive(OpenApi)]` structs that are merged into this root document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Backapp API",
        description = "Server backups with retention and cascading deletion.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "servers", description = "Backup source servers"),
        (name = "storage_locations", description = "Local storage roots"),
        (name = "backup_profiles", description = "Backup profiles, commands and file rules"),
        (name = "backup_runs", description = "Run history, files and logs"),
        (name = "test", description = "Test-only endpoints"),
        (name = "health", description = "Health checks"),
    ),
    components(schemas(ErrorResponse))
)]
pub struct ApiDoc;

/// Standard error response body returned by all endpoints on failure.
#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "NOT_FOUND", "VALIDATION_ERROR")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// Build the merged OpenAPI document from all handler modules.
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    doc.merge(super::handlers::servers::ServersApiDoc::openapi());
    doc.merge(super::handlers::storage_locations::StorageLocationsApiDoc::openapi());
    doc.merge(super::handlers::backup_profiles::BackupProfilesApiDoc::openapi());
    doc.merge(super::handlers::backup_runs::BackupRunsApiDoc::openapi());
    doc.merge(super::handlers::admin::AdminApiDoc::openapi());
    doc.merge(super::handlers::health::HealthApiDoc::openapi());

    doc
}
