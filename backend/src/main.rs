//! Backapp - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;

use backapp_backend::{
    api::{self, AppState},
    config::Config,
    db,
    error::Result,
    services::{
        profile_scheduler::{InMemoryProfileScheduler, ProfileScheduler},
        retention_task::RetentionTask,
    },
    shutdown::shutdown_signal,
    storage::FilesystemDisk,
    store::{PgStore, Store},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;
    telemetry::init_tracing(&config.log_level);
    tracing::info!(?config, "Starting Backapp");

    // Connect to database
    let db_pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Connected to database");

    db::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations complete");

    let store: Arc<dyn Store> = Arc::new(PgStore::new(db_pool));

    // Register enabled profiles with the scheduler
    let scheduler: Arc<dyn ProfileScheduler> = Arc::new(InMemoryProfileScheduler::new());
    for profile in store.list_profiles().await? {
        if let Err(e) = scheduler.schedule_profile(&profile).await {
            tracing::warn!(profile_id = %profile.id, "Failed to schedule profile: {}", e);
        }
    }

    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        scheduler,
        Arc::new(FilesystemDisk),
    ));

    let retention = RetentionTask::new(
        state.retention.clone(),
        Duration::from_secs(config.retention_interval_secs.max(1)),
        config.retention_run_on_start,
    )
    .start();

    let app = api::routes::create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    retention.stop().await;
    tracing::info!("Backapp stopped");
    Ok(())
}
