use club_manager::api::routes::create_routes;
use club_manager::config::{run_migrations, AppConfig, DatabaseConfig};
use club_manager::services::SchedulerService;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let app_config = AppConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;

    let db = db_config.create_pool().await?;
    run_migrations(&db).await?;

    // Background jobs: nightly session generation, weekly absence scan
    let _scheduler = if app_config.scheduler_enabled {
        let scheduler = SchedulerService::new(db.clone(), app_config.clone());
        Some(scheduler.start().await?)
    } else {
        None
    };

    let app = create_routes(db, &app_config);

    let address = app_config.server_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Club Manager server starting on http://{}", address);
    info!("Health check available at http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
