use serde_json::json;
use std::sync::Arc;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{DatabaseManager, PgStore};
use crate::vpn::{VpnConnectivityMonitor, WgProbe};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let database = DatabaseManager::from_env(&config.database).await?;

    let monitor = VpnConnectivityMonitor::from_config(
        Arc::new(WgProbe::from_config(&config.monitor)),
        Arc::new(PgStore::new(database.pool())),
        &config.monitor,
    );

    let result = monitor.tick().await;
    database.close().await;

    output_success(
        &output_format,
        &format!(
            "Reconciled: {} updated, {} online, {} offline",
            result.updated, result.online, result.offline
        ),
        Some(json!({ "result": result })),
    )
}
