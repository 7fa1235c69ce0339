use std::sync::Arc;

use course_sync::api::router;
use course_sync::config::SyncConfig;
use course_sync::loader::SchemaRegistry;
use course_sync::state::AppState;
use course_sync::sync::{SyncCoordinator, SyncScheduler};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_sync=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SyncConfig::new_from_env()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let registry = Arc::new(SchemaRegistry::new()?);
    let coordinator = Arc::new(SyncCoordinator::new(pool.clone(), registry));
    let course_dirs = Arc::new(config.course_dirs.clone());

    if std::env::args().any(|arg| arg == "--once") {
        let results = coordinator.sync_all(&course_dirs).await;
        let failed = results.iter().filter(|r| r.error.is_some()).count();
        println!("{}", serde_json::to_string_pretty(&results)?);
        if failed > 0 {
            error!("{} of {} courses failed to sync", failed, results.len());
            std::process::exit(1);
        }
        return Ok(());
    }

    if let Some(interval) = config.sync_interval_secs {
        let scheduler = SyncScheduler::new(coordinator.clone(), course_dirs.clone(), interval);
        tokio::spawn(scheduler.start());
    }

    let state = AppState {
        db: pool.clone(),
        coordinator,
        course_dirs,
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
