// tenant/decision.rs - Pure tenant access decision shared by every call path

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::{Tenant, TenantStatus};

pub const REASON_SUSPENDED: &str = "suspended";
pub const REASON_EXPIRED: &str = "expired";
pub const REASON_TRIAL_NOT_CONFIGURED: &str = "trial not configured";
pub const REASON_TRIAL_EXPIRED: &str = "trial expired";
pub const REASON_NOT_CONFIGURED: &str = "not properly configured";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Status the caller must persist before acting on the decision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_to: Option<TenantStatus>,
}

impl TenantDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            transition_to: None,
        }
    }

    fn deny(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
            transition_to: None,
        }
    }
}

pub fn decide(tenant: &Tenant, now: DateTime<Utc>) -> TenantDecision {
    match tenant.status {
        TenantStatus::Suspended => return TenantDecision::deny(REASON_SUSPENDED),
        TenantStatus::Expired => return TenantDecision::deny(REASON_EXPIRED),
        _ => {}
    }

    if tenant.is_activated {
        match tenant.subscription_ends_at {
            Some(ends_at) if ends_at > now => return TenantDecision::allow(),
            // Activated without an end date means an unlimited subscription
            None => return TenantDecision::allow(),
            Some(_) => {}
        }
    }

    if tenant.status == TenantStatus::Trial {
        return match tenant.trial_ends_at {
            None => TenantDecision::deny(REASON_TRIAL_NOT_CONFIGURED),
            Some(ends_at) if ends_at < now => TenantDecision {
                transition_to: Some(TenantStatus::Expired),
                ..TenantDecision::deny(REASON_TRIAL_EXPIRED)
            },
            Some(_) => TenantDecision::allow(),
        };
    }

    TenantDecision::deny(REASON_NOT_CONFIGURED)
}
