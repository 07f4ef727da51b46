// handlers/public/health.rs - GET /health handler

use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// Database ping; 503 when the pool cannot reach Postgres
pub async fn health(State(state): State<AppState>) -> ApiResult<HealthReport> {
    let database = match &state.database {
        Some(db) => {
            db.health_check().await?;
            "connected"
        }
        None => "in-memory",
    };

    Ok(ApiResponse::success(HealthReport {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
    }))
}
