use anyhow::Result;
use tracing::info;

use member_portal_api::{app, config, middleware, services};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging and metrics
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting Member Portal API v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config).await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // Promote configured administrators that already have a record
    let members = persistence::repositories::MemberRepository::new(pool.clone());
    services::admin_bootstrap::bootstrap_admins(&members, &config.admin).await?;

    std::fs::create_dir_all(&config.uploads.dir)?;

    // Build application
    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool)?;

    // Start server
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
