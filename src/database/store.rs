use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::{Nas, NasStatus, Tenant};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid row: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persisted NAS rows, as seen by the connectivity monitor
#[async_trait]
pub trait NasStore: Send + Sync {
    /// All NAS rows with a VPN address assigned
    async fn list_monitored(&self) -> StoreResult<Vec<Nas>>;

    async fn list_monitored_for_tenant(&self, tenant_id: Uuid) -> StoreResult<Vec<Nas>>;

    async fn find_nas(&self, id: Uuid) -> StoreResult<Option<Nas>>;

    /// Status transition; `last_seen` is only written when given
    async fn set_status(
        &self,
        id: Uuid,
        status: NasStatus,
        last_seen: Option<DateTime<Utc>>,
    ) -> StoreResult<()>;

    /// Heartbeat for a NAS whose status did not change
    async fn touch_last_seen(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()>;
}

#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>>;

    /// Compare-and-set TRIAL -> EXPIRED. Returns true only for the caller
    /// whose write actually changed the row.
    async fn expire_trial(&self, id: Uuid) -> StoreResult<bool>;
}
