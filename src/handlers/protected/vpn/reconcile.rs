// handlers/protected/vpn/reconcile.rs - POST /api/vpn/reconcile handler

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::authz::Identity;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::permissions::catalog::ROUTERS_CONFIGURE;
use crate::vpn::TickResult;

/// Run one reconciliation pass now. Refuses rather than queues when the
/// scheduler's tick is still in flight.
pub async fn reconcile_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<TickResult> {
    state.facade.require(&identity, ROUTERS_CONFIGURE)?;

    match state.monitor.try_tick().await {
        Some(result) => {
            tracing::info!(
                "Manual reconcile by {}: {} updated, {} online, {} offline",
                identity.id,
                result.updated,
                result.online,
                result.offline
            );
            Ok(ApiResponse::success(result))
        }
        None => Err(ApiError::conflict("A reconciliation pass is already running")),
    }
}
