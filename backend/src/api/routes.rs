//! Route definitions for the API.

use axum::{routing::get, Json, Router};

use super::handlers;
use super::SharedState;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    // Build OpenAPI spec once at startup
    let openapi = super::openapi::build_openapi();

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/v1/openapi.json",
            get(move || {
                let doc = openapi.clone();
                async move { Json(doc) }
            }),
        )
        .nest("/api/v1", api_v1_routes(&state))
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes(state: &SharedState) -> Router<SharedState> {
    let router = Router::new()
        .nest("/servers", handlers::servers::router())
        .nest("/storage-locations", handlers::storage_locations::router())
        .nest("/backup-profiles", handlers::backup_profiles::router())
        .nest("/backup-runs", handlers::backup_runs::runs_router())
        .nest("/backup-files", handlers::backup_runs::files_router());

    if state.config.enable_test_endpoints {
        tracing::info!("Test endpoints enabled under /api/v1/test");
        router.nest("/test", handlers::admin::test_router())
    } else {
        router
    }
}
