use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ispmgr_core::app::{router, AppState};
use ispmgr_core::config;
use ispmgr_core::database::{DatabaseManager, PgStore};
use ispmgr_core::is_production;
use ispmgr_core::vpn::{MonitorScheduler, WgProbe};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting ispmgr-core in {:?} mode", config.environment);

    if is_production!() && config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set in production");
    }

    let database = DatabaseManager::from_env(&config.database)
        .await
        .context("failed to connect to the platform database")?;
    let store = Arc::new(PgStore::new(database.pool()));
    let probe = Arc::new(WgProbe::from_config(&config.monitor));

    let state = AppState::from_parts(store.clone(), store, probe, config).with_database(database.clone());

    let mut scheduler = MonitorScheduler::new(state.monitor.clone(), config.monitor.period());
    if config.monitor.enabled {
        scheduler.start();
    } else {
        tracing::info!("VPN monitor disabled");
    }

    let app = router(state, config.security.enable_cors);

    // Allow tests or deployments to override port via env
    let port = std::env::var("ISPMGR_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("ispmgr-core listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    scheduler.stop().await;
    database.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
