// handlers/protected/auth/permissions.rs - GET /api/auth/permissions handler

use axum::Extension;
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::authz::Identity;
use crate::middleware::{ApiResponse, ApiResult};
use crate::permissions::Role;

#[derive(Debug, Serialize)]
pub struct PermissionsView {
    pub id: Uuid,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
    pub permissions: BTreeSet<String>,
}

/// Effective permission set of the caller, for UI menu gating
pub async fn permissions_get(Extension(identity): Extension<Identity>) -> ApiResult<PermissionsView> {
    Ok(ApiResponse::success(PermissionsView {
        id: identity.id,
        role: identity.role,
        tenant_id: identity.tenant_id,
        permissions: identity.permissions(),
    }))
}
