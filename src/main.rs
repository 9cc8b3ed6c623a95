//! Anticip Backend Service
//!
//! Main entry point for the Anticip fantasy music stock market backend.
//! This binary runs the background jobs:
//! - periodic popularity refresh from the catalog provider
//! - portfolio net-worth snapshots after each refresh
//!
//! Presentation layers consume the library crate directly.

use anticip_backend::config::AppConfig;
use anticip_backend::database::{create_pool, run_migrations};
use anticip_backend::error::{AppError, AppResult};
use anticip_backend::services::{CatalogClient, PopularityRefresher, PortfolioService};
use anticip_backend::AppState;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("anticip_backend={},sqlx=warn", config.log_level).into()
            }),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Anticip Backend Service Starting                ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("Starting balance: {}", config.starting_balance);
    info!("Per-trade share cap: {}", config.max_shares_per_trade);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    // Run migrations
    info!("Running database migrations...");
    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    info!("Initializing core services...");

    // Initialize application state with repositories
    let app_state = Arc::new(AppState::new(pool.clone()));
    info!("✓ Application state initialized with repositories");

    // Initialize catalog client
    let catalog = Arc::new(CatalogClient::new(config.catalog.clone()));
    info!("✓ Catalog client initialized ({})", config.catalog.api_base_url);

    // Initialize portfolio service (valuation + snapshot sweeps)
    let portfolio_service = Arc::new(PortfolioService::new(
        app_state.user_repo.clone(),
        app_state.ledger_repo.clone(),
        app_state.portfolio_repo.clone(),
    ));
    info!("✓ Portfolio service initialized");

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    info!("Starting background tasks...");

    let refresher = PopularityRefresher::new(
        app_state.artist_repo.clone(),
        app_state.history_repo.clone(),
        catalog.clone(),
        portfolio_service.clone(),
        config.refresh_interval(),
    );

    let refresher_handle = tokio::spawn(async move {
        refresher.start().await;
    });
    info!(
        "✓ Popularity refresher started ({}s interval)",
        config.refresh_interval_secs
    );

    // =========================================================================
    // READY
    // =========================================================================
    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Anticip Backend Service Ready!                  ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = refresher_handle => {
            error!("Popularity refresher task exited unexpectedly");
        }
    }

    info!("Anticip backend service shutdown complete");
    Ok(())
}
