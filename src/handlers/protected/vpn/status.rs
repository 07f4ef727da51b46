// handlers/protected/vpn/status.rs - GET /api/vpn/status[/:nas_id] handlers

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::Identity;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::permissions::catalog::ROUTERS_VIEW;
use crate::permissions::Role;
use crate::vpn::NasVpnStatus;

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    /// Only honoured for SUPER_ADMIN callers, who carry no tenant of their own
    pub tenant_id: Option<Uuid>,
}

/// Live connectivity of every monitored NAS of the caller's tenant
pub async fn status_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Vec<NasVpnStatus>> {
    state.facade.require(&identity, ROUTERS_VIEW)?;

    let tenant_id = if identity.role == Role::SuperAdmin {
        query.tenant_id.or(identity.tenant_id)
    } else {
        identity.tenant_id
    }
    .ok_or_else(|| ApiError::bad_request("tenant_id query parameter is required"))?;

    let statuses = state.monitor.status_for_tenant(tenant_id).await?;
    Ok(ApiResponse::success(statuses))
}

/// Live connectivity of one NAS. Another tenant's NAS reads as not found.
pub async fn nas_status_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(nas_id): Path<Uuid>,
) -> ApiResult<NasVpnStatus> {
    state.facade.require(&identity, ROUTERS_VIEW)?;

    let scope = match identity.role {
        Role::SuperAdmin => None,
        _ => Some(
            identity
                .tenant_id
                .ok_or_else(|| ApiError::not_found("NAS not found"))?,
        ),
    };

    let status = state.monitor.status_within(nas_id, scope).await?;
    Ok(ApiResponse::success(status))
}
