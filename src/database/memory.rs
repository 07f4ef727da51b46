//! In-memory NAS and tenant store.
//!
//! Backs tests and local runs without Postgres. Every mutation is appended to a
//! write log so callers can see exactly which rows a reconciliation touched.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Nas, NasStatus, Tenant, TenantStatus};
use super::store::{NasStore, StoreResult, TenantStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    NasStatus {
        id: Uuid,
        status: NasStatus,
        last_seen: Option<DateTime<Utc>>,
    },
    NasHeartbeat {
        id: Uuid,
        at: DateTime<Utc>,
    },
    TenantExpired {
        id: Uuid,
    },
}

#[derive(Default)]
pub struct MemoryStore {
    nas: RwLock<HashMap<Uuid, Nas>>,
    tenants: RwLock<HashMap<Uuid, Tenant>>,
    writes: RwLock<Vec<StoreWrite>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_nas(&self, nas: Nas) {
        self.nas.write().await.insert(nas.id, nas);
    }

    pub async fn insert_tenant(&self, tenant: Tenant) {
        self.tenants.write().await.insert(tenant.id, tenant);
    }

    pub async fn nas(&self, id: Uuid) -> Option<Nas> {
        self.nas.read().await.get(&id).cloned()
    }

    pub async fn tenant(&self, id: Uuid) -> Option<Tenant> {
        self.tenants.read().await.get(&id).cloned()
    }

    pub async fn writes(&self) -> Vec<StoreWrite> {
        self.writes.read().await.clone()
    }

    pub async fn clear_writes(&self) {
        self.writes.write().await.clear();
    }

    // Rows come back in name order so callers see a stable listing.
    fn sorted(mut rows: Vec<Nas>) -> Vec<Nas> {
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        rows
    }
}

#[async_trait]
impl NasStore for MemoryStore {
    async fn list_monitored(&self) -> StoreResult<Vec<Nas>> {
        let rows = self
            .nas
            .read()
            .await
            .values()
            .filter(|nas| nas.vpn_ip.is_some())
            .cloned()
            .collect();
        Ok(Self::sorted(rows))
    }

    async fn list_monitored_for_tenant(&self, tenant_id: Uuid) -> StoreResult<Vec<Nas>> {
        let rows = self
            .nas
            .read()
            .await
            .values()
            .filter(|nas| nas.tenant_id == tenant_id && nas.vpn_ip.is_some())
            .cloned()
            .collect();
        Ok(Self::sorted(rows))
    }

    async fn find_nas(&self, id: Uuid) -> StoreResult<Option<Nas>> {
        Ok(self.nas.read().await.get(&id).cloned())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: NasStatus,
        last_seen: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        let changed = match self.nas.write().await.get_mut(&id) {
            Some(nas) => {
                nas.status = status;
                if let Some(at) = last_seen {
                    nas.last_seen = Some(at);
                }
                true
            }
            None => false,
        };
        if changed {
            self.writes.write().await.push(StoreWrite::NasStatus {
                id,
                status,
                last_seen,
            });
        }
        Ok(())
    }

    async fn touch_last_seen(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        let changed = match self.nas.write().await.get_mut(&id) {
            Some(nas) => {
                nas.last_seen = Some(at);
                true
            }
            None => false,
        };
        if changed {
            self.writes
                .write()
                .await
                .push(StoreWrite::NasHeartbeat { id, at });
        }
        Ok(())
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        Ok(self.tenants.read().await.get(&id).cloned())
    }

    async fn expire_trial(&self, id: Uuid) -> StoreResult<bool> {
        // Check and write under one lock so concurrent callers serialize.
        let expired = {
            let mut tenants = self.tenants.write().await;
            match tenants.get_mut(&id) {
                Some(tenant) if tenant.status == TenantStatus::Trial => {
                    tenant.status = TenantStatus::Expired;
                    true
                }
                _ => false,
            }
        };
        if expired {
            self.writes
                .write()
                .await
                .push(StoreWrite::TenantExpired { id });
        }
        Ok(expired)
    }
}
