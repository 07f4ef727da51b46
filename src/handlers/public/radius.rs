// handlers/public/radius.rs - POST /radius/authorize handler
//
// Called by the RADIUS server before accepting a subscriber session. The gate
// never fails on this path: any denial or lookup problem becomes
// `{ allowed: false, reason }`.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::tenant::RadiusDecision;

pub const RADIUS_SECRET_HEADER: &str = "x-radius-secret";

#[derive(Debug, Deserialize)]
pub struct RadiusAuthorizeRequest {
    pub tenant_id: Uuid,
}

pub async fn radius_authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RadiusAuthorizeRequest>,
) -> Result<Json<RadiusDecision>, ApiError> {
    // An unset secret matches nothing, so the endpoint stays closed
    let presented = headers
        .get(RADIUS_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if state.radius_secret.is_empty()
        || !constant_time_eq(presented.as_bytes(), state.radius_secret.as_bytes())
    {
        tracing::warn!("RADIUS authorize rejected: bad shared secret");
        return Err(ApiError::unauthorized("Invalid RADIUS shared secret"));
    }

    let decision = state.facade.gate().authenticate(body.tenant_id).await;
    if !decision.allowed {
        tracing::info!(
            "RADIUS denied for tenant {}: {}",
            body.tenant_id,
            decision.reason.as_deref().unwrap_or("unknown")
        );
    }

    Ok(Json(decision))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (left, right) in a.iter().zip(b.iter()) {
        diff |= left ^ right;
    }
    diff == 0
}
