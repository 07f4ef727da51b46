// tenant/gate.rs - Tenant lifecycle gate and its HTTP / RADIUS adapters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::decision::{decide, TenantDecision};
use crate::authz::AuthzError;
use crate::database::models::{Tenant, TenantStatus};
use crate::database::store::{StoreError, TenantStore};

pub const REASON_TENANT_NOT_FOUND: &str = "tenant not found";
pub const REASON_LOOKUP_FAILED: &str = "tenant lookup failed";

/// Answer handed to the RADIUS authentication server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadiusDecision {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Clone)]
pub struct TenantLifecycleGate {
    store: Arc<dyn TenantStore>,
}

impl TenantLifecycleGate {
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self { store }
    }

    /// Load, decide, and persist any transition the decision requires.
    /// Returns `None` when the tenant does not exist.
    pub async fn evaluate(
        &self,
        tenant_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<(Tenant, TenantDecision)>, StoreError> {
        let Some(mut tenant) = self.store.find_tenant(tenant_id).await? else {
            return Ok(None);
        };

        let decision = decide(&tenant, now);
        if decision.transition_to == Some(TenantStatus::Expired) {
            self.apply_expiry(&mut tenant).await;
        }

        Ok(Some((tenant, decision)))
    }

    async fn apply_expiry(&self, tenant: &mut Tenant) {
        match self.store.expire_trial(tenant.id).await {
            Ok(true) => {
                tracing::info!("Tenant {} trial expired, status set to EXPIRED", tenant.id);
                tenant.status = TenantStatus::Expired;
            }
            // Another evaluation already wrote the transition
            Ok(false) => {
                tracing::debug!("Tenant {} trial expiry already applied", tenant.id);
                tenant.status = TenantStatus::Expired;
            }
            Err(e) => {
                tracing::error!("Failed to persist trial expiry for tenant {}: {}", tenant.id, e);
            }
        }
    }

    /// HTTP path: missing tenant and denials become authorization failures
    pub async fn check(&self, tenant_id: Uuid) -> Result<Tenant, AuthzError> {
        self.check_at(tenant_id, Utc::now()).await
    }

    pub async fn check_at(&self, tenant_id: Uuid, now: DateTime<Utc>) -> Result<Tenant, AuthzError> {
        let (tenant, decision) = self
            .evaluate(tenant_id, now)
            .await?
            .ok_or(AuthzError::TenantNotFound(tenant_id))?;

        if decision.allowed {
            return Ok(tenant);
        }

        let reason = decision.reason.unwrap_or_default();
        tracing::warn!("Tenant {} denied: {}", tenant_id, reason);
        Err(AuthzError::Denied { reason })
    }

    /// RADIUS path: never fails, store errors deny the session
    pub async fn authenticate(&self, tenant_id: Uuid) -> RadiusDecision {
        self.authenticate_at(tenant_id, Utc::now()).await
    }

    pub async fn authenticate_at(&self, tenant_id: Uuid, now: DateTime<Utc>) -> RadiusDecision {
        match self.evaluate(tenant_id, now).await {
            Ok(Some((_, decision))) => RadiusDecision {
                allowed: decision.allowed,
                reason: decision.reason,
            },
            Ok(None) => RadiusDecision {
                allowed: false,
                reason: Some(REASON_TENANT_NOT_FOUND.to_string()),
            },
            Err(e) => {
                tracing::error!("RADIUS tenant check for {} failed: {}", tenant_id, e);
                RadiusDecision {
                    allowed: false,
                    reason: Some(REASON_LOOKUP_FAILED.to_string()),
                }
            }
        }
    }
}
