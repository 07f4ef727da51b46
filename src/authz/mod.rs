// authz/mod.rs - Composition point for per-request authorization
//
// Route middleware resolves the caller's identity, then asks the facade to run
// the tenant lifecycle gate followed by the permission check.

pub mod error;

pub use error::AuthzError;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

use crate::database::models::Tenant;
use crate::permissions::{effective_permissions, has_any_role, has_permission, Role};
use crate::tenant::TenantLifecycleGate;

/// Per-request snapshot of the calling operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
    #[serde(default)]
    pub added: HashSet<String>,
    #[serde(default)]
    pub removed: HashSet<String>,
}

impl Identity {
    pub fn new(id: Uuid, role: Role, tenant_id: Option<Uuid>) -> Self {
        Self {
            id,
            role,
            tenant_id,
            added: HashSet::new(),
            removed: HashSet::new(),
        }
    }

    pub fn can(&self, permission: &str) -> bool {
        has_permission(self.role, &self.added, &self.removed, permission)
    }

    pub fn permissions(&self) -> BTreeSet<String> {
        effective_permissions(self.role, &self.added, &self.removed)
    }
}

#[derive(Clone)]
pub struct AuthorizationFacade {
    gate: TenantLifecycleGate,
}

impl AuthorizationFacade {
    pub fn new(gate: TenantLifecycleGate) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &TenantLifecycleGate {
        &self.gate
    }

    /// Run the lifecycle gate for the identity's tenant. Platform-level
    /// SUPER_ADMIN identities carry no tenant and skip the gate.
    pub async fn check_tenant(&self, identity: &Identity) -> Result<Option<Tenant>, AuthzError> {
        match identity.tenant_id {
            Some(tenant_id) => self.gate.check(tenant_id).await.map(Some),
            None if identity.role == Role::SuperAdmin => Ok(None),
            None => Err(AuthzError::NoTenant),
        }
    }

    pub fn require(&self, identity: &Identity, permission: &str) -> Result<(), AuthzError> {
        if identity.can(permission) {
            Ok(())
        } else {
            tracing::debug!("Identity {} ({}) lacks {}", identity.id, identity.role, permission);
            Err(AuthzError::Forbidden {
                permission: permission.to_string(),
            })
        }
    }

    pub fn require_role(&self, identity: &Identity, roles: &[Role]) -> Result<(), AuthzError> {
        if has_any_role(identity.role, roles) {
            Ok(())
        } else {
            Err(AuthzError::RoleNotPermitted(identity.role))
        }
    }

    /// Gate then permission, in that order
    pub async fn authorize(
        &self,
        identity: &Identity,
        permission: &str,
    ) -> Result<Option<Tenant>, AuthzError> {
        let tenant = self.check_tenant(identity).await?;
        self.require(identity, permission)?;
        Ok(tenant)
    }
}
