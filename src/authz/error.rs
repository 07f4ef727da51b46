use thiserror::Error;
use uuid::Uuid;

use crate::database::store::StoreError;
use crate::permissions::Role;

#[derive(Debug, Error)]
pub enum AuthzError {
    /// Tenant lifecycle gate refused the organization
    #[error("Access denied: {reason}")]
    Denied { reason: String },

    #[error("Missing permission: {permission}")]
    Forbidden { permission: String },

    #[error("Role not permitted: {0}")]
    RoleNotPermitted(Role),

    #[error("Tenant not found: {0}")]
    TenantNotFound(Uuid),

    #[error("Identity is not bound to a tenant")]
    NoTenant,

    #[error(transparent)]
    Store(#[from] StoreError),
}
