use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::authz::Identity;
use crate::database::models::Tenant;
use crate::error::ApiError;

/// Tenant that passed the lifecycle gate for this request.
/// `None` for platform-level SUPER_ADMIN callers without a tenant.
#[derive(Clone, Debug)]
pub struct ActiveTenant(pub Option<Tenant>);

/// Runs the tenant lifecycle gate for the authenticated caller. Must be layered
/// inside `jwt_auth_middleware`.
pub async fn tenant_gate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before tenant validation"))?;

    let tenant = state.facade.check_tenant(&identity).await?;
    request.extensions_mut().insert(ActiveTenant(tenant));

    Ok(next.run(request).await)
}
