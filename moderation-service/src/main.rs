use actix_web::{web, App, HttpServer};
use moderation_service::{
    config::Config,
    handlers::AppState,
    routes,
    services::{spawn_ban_reaper, ModerationCoordinator, ReportQueryService},
    store::{BanStore, CatalogStore, ModerationLog, PgBanStore, PgCatalogStore, PgModerationLog,
        PgReportStore, ReportStore},
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    tracing::info!("Starting Moderation Service...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        http_port = %config.http_port,
        "Configuration loaded"
    );

    // Initialize database pool using shared library
    let db_config = db_pool::DbConfig::from_env(&config.service_name)?;
    db_config.log_config();
    let db = Arc::new(db_pool::create_pool(db_config).await?);
    tracing::info!("Database pool initialized");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&*db).await.map_err(|e| {
        tracing::error!("Migration failed: {}", e);
        e
    })?;
    tracing::info!("Migrations completed successfully");

    // Initialize stores
    let catalog: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(db.clone()));
    let reports: Arc<dyn ReportStore> = Arc::new(PgReportStore::new(db.clone()));
    let bans: Arc<dyn BanStore> = Arc::new(PgBanStore::new(db.clone()));
    let log: Arc<dyn ModerationLog> = Arc::new(PgModerationLog::new(db.clone()));

    // Initialize services
    let coordinator = Arc::new(ModerationCoordinator::new(
        catalog.clone(),
        reports.clone(),
        bans.clone(),
        log.clone(),
        config.timeout_window_hours,
    ));
    let queries = Arc::new(ReportQueryService::new(reports.clone(), catalog.clone()));

    // Spawn the expired-ban reaper
    let reaper_handle = if config.reaper_enabled {
        tracing::info!(
            interval_secs = config.reaper_interval_secs,
            "Starting expired-ban reaper"
        );
        Some(spawn_ban_reaper(bans.clone(), config.reaper_interval_secs))
    } else {
        tracing::info!("Expired-ban reaper disabled (BAN_REAPER_ENABLED=false)");
        None
    };

    let state = AppState {
        coordinator,
        queries,
        catalog,
        reports,
        bans,
        log,
    };
    let data = web::Data::new(state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    tracing::info!("Moderation Service listening on http://{}", bind_addr);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind(&bind_addr)?
    .run();

    let result = server.await;

    if let Some(handle) = reaper_handle {
        handle.abort();
    }

    result.map_err(Into::into)
}
