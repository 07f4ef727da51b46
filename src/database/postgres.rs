//! Postgres-backed NAS and tenant store.
//!
//! Expected columns (schema migrations live outside this crate):
//! - `nas(id uuid, tenant_id uuid, name text, vpn_ip text null, vpn_public_key text null,
//!   status text, last_seen timestamptz null, uptime text null)`
//! - `tenants(id uuid, status text, is_activated bool, trial_ends_at timestamptz null,
//!   subscription_ends_at timestamptz null)`
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::models::{Nas, NasStatus, Tenant, TenantStatus};
use super::store::{NasStore, StoreError, StoreResult, TenantStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NasRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    vpn_ip: Option<String>,
    vpn_public_key: Option<String>,
    status: String,
    last_seen: Option<DateTime<Utc>>,
    uptime: Option<String>,
}

impl TryFrom<NasRow> for Nas {
    type Error = StoreError;

    fn try_from(row: NasRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<NasStatus>().map_err(StoreError::Decode)?;
        Ok(Nas {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            vpn_ip: row.vpn_ip,
            vpn_public_key: row.vpn_public_key,
            status,
            last_seen: row.last_seen,
            uptime: row.uptime,
        })
    }
}

#[derive(Debug, FromRow)]
struct TenantRow {
    id: Uuid,
    status: String,
    is_activated: bool,
    trial_ends_at: Option<DateTime<Utc>>,
    subscription_ends_at: Option<DateTime<Utc>>,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = StoreError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<TenantStatus>().map_err(StoreError::Decode)?;
        Ok(Tenant {
            id: row.id,
            status,
            is_activated: row.is_activated,
            trial_ends_at: row.trial_ends_at,
            subscription_ends_at: row.subscription_ends_at,
        })
    }
}

const NAS_COLUMNS: &str =
    "id, tenant_id, name, vpn_ip, vpn_public_key, status, last_seen, uptime";

fn decode_all(rows: Vec<NasRow>) -> StoreResult<Vec<Nas>> {
    rows.into_iter().map(Nas::try_from).collect()
}

#[async_trait]
impl NasStore for PgStore {
    async fn list_monitored(&self) -> StoreResult<Vec<Nas>> {
        let query = format!(
            "SELECT {NAS_COLUMNS} FROM nas WHERE vpn_ip IS NOT NULL ORDER BY name, id"
        );
        let rows = sqlx::query_as::<_, NasRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        decode_all(rows)
    }

    async fn list_monitored_for_tenant(&self, tenant_id: Uuid) -> StoreResult<Vec<Nas>> {
        let query = format!(
            "SELECT {NAS_COLUMNS} FROM nas WHERE tenant_id = $1 AND vpn_ip IS NOT NULL ORDER BY name, id"
        );
        let rows = sqlx::query_as::<_, NasRow>(&query)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        decode_all(rows)
    }

    async fn find_nas(&self, id: Uuid) -> StoreResult<Option<Nas>> {
        let query = format!("SELECT {NAS_COLUMNS} FROM nas WHERE id = $1");
        let row = sqlx::query_as::<_, NasRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Nas::try_from).transpose()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: NasStatus,
        last_seen: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        sqlx::query("UPDATE nas SET status = $2, last_seen = COALESCE($3, last_seen) WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(last_seen)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn touch_last_seen(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE nas SET last_seen = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TenantStore for PgStore {
    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(
            "SELECT id, status, is_activated, trial_ends_at, subscription_ends_at FROM tenants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Tenant::try_from).transpose()
    }

    async fn expire_trial(&self, id: Uuid) -> StoreResult<bool> {
        // Guarded update: concurrent evaluations converge on one effective write.
        let result = sqlx::query(
            "UPDATE tenants SET status = 'EXPIRED' WHERE id = $1 AND status = 'TRIAL'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
