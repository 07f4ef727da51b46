// vpn/monitor.rs - Reconcile live peer telemetry against persisted NAS rows

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::duration::format_elapsed;
use super::matcher::match_sample;
use super::probe::{probe_with_timeout, ConnectivityProbe, PeerSample, ProbeError};
use crate::config::MonitorConfig;
use crate::database::models::{Nas, NasStatus};
use crate::database::store::{NasStore, StoreError};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("NAS not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Aggregate outcome of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickResult {
    /// Status transitions written
    pub updated: usize,
    pub online: usize,
    pub offline: usize,
}

/// Point-in-time connectivity view of one NAS; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NasVpnStatus {
    pub nas_id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub vpn_ip: Option<String>,
    pub vpn_public_key: Option<String>,
    /// Status as last persisted by reconciliation
    pub status: NasStatus,
    pub is_connected: bool,
    /// False when the probe failed and the view is built from persisted state
    pub live: bool,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_handshake: Option<DateTime<Utc>>,
    pub endpoint: Option<String>,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub uptime: Option<String>,
    pub offline_duration: Option<String>,
}

pub struct VpnConnectivityMonitor {
    probe: Arc<dyn ConnectivityProbe>,
    store: Arc<dyn NasStore>,
    handshake_timeout: Duration,
    probe_timeout: Duration,
    tick_guard: Mutex<()>,
}

impl VpnConnectivityMonitor {
    pub fn new(
        probe: Arc<dyn ConnectivityProbe>,
        store: Arc<dyn NasStore>,
        handshake_timeout: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            probe,
            store,
            handshake_timeout,
            probe_timeout,
            tick_guard: Mutex::new(()),
        }
    }

    pub fn from_config(
        probe: Arc<dyn ConnectivityProbe>,
        store: Arc<dyn NasStore>,
        config: &MonitorConfig,
    ) -> Self {
        Self::new(probe, store, config.handshake_timeout(), config.probe_timeout())
    }

    /// One probe run with liveness derived for every sample
    async fn sample(&self, now: DateTime<Utc>) -> Result<Vec<PeerSample>, ProbeError> {
        let mut samples = probe_with_timeout(self.probe.as_ref(), self.probe_timeout).await?;
        for sample in &mut samples {
            sample.refresh_liveness(now, self.handshake_timeout);
        }
        Ok(samples)
    }

    pub async fn tick(&self) -> TickResult {
        let _guard = self.tick_guard.lock().await;
        self.reconcile(Utc::now()).await
    }

    pub async fn tick_at(&self, now: DateTime<Utc>) -> TickResult {
        let _guard = self.tick_guard.lock().await;
        self.reconcile(now).await
    }

    /// Run a tick unless one is already in flight
    pub async fn try_tick(&self) -> Option<TickResult> {
        let _guard = self.tick_guard.try_lock().ok()?;
        Some(self.reconcile(Utc::now()).await)
    }

    async fn reconcile(&self, now: DateTime<Utc>) -> TickResult {
        let samples = match self.sample(now).await {
            Ok(samples) => samples,
            Err(e) => {
                tracing::warn!("VPN probe failed, keeping persisted NAS state: {}", e);
                return TickResult::default();
            }
        };

        let rows = match self.store.list_monitored().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("Failed to load NAS rows for VPN reconciliation: {}", e);
                return TickResult::default();
            }
        };

        let mut result = TickResult::default();

        for nas in rows {
            let connected = match_sample(&nas, &samples).map_or(false, |s| s.is_connected);
            if connected {
                result.online += 1;
            } else {
                result.offline += 1;
            }

            let new_status = if connected { NasStatus::Online } else { NasStatus::Offline };

            if new_status != nas.status {
                let last_seen = connected.then_some(now);
                match self.store.set_status(nas.id, new_status, last_seen).await {
                    Ok(()) => {
                        result.updated += 1;
                        tracing::info!(
                            nas_id = %nas.id,
                            "NAS '{}' {} -> {}",
                            nas.name, nas.status, new_status
                        );
                    }
                    Err(e) => {
                        tracing::error!("Failed to update status of NAS {}: {}", nas.id, e);
                    }
                }
            } else if connected {
                match self.store.touch_last_seen(nas.id, now).await {
                    Ok(()) => tracing::debug!("NAS {} heartbeat", nas.id),
                    Err(e) => tracing::error!("Failed to refresh last_seen of NAS {}: {}", nas.id, e),
                }
            }
        }

        tracing::debug!(
            updated = result.updated,
            online = result.online,
            offline = result.offline,
            "VPN reconciliation complete"
        );

        result
    }

    /// Live connectivity of one NAS; probes afresh rather than reading the last tick
    pub async fn status(&self, nas_id: Uuid) -> Result<NasVpnStatus, MonitorError> {
        self.status_at(nas_id, Utc::now()).await
    }

    pub async fn status_at(&self, nas_id: Uuid, now: DateTime<Utc>) -> Result<NasVpnStatus, MonitorError> {
        self.status_within_at(nas_id, None, now).await
    }

    /// Like `status`, restricted to one tenant's rows. Ownership is settled from
    /// the stored row before sampling; a foreign NAS reads as not found.
    pub async fn status_within(
        &self,
        nas_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> Result<NasVpnStatus, MonitorError> {
        self.status_within_at(nas_id, tenant_id, Utc::now()).await
    }

    pub async fn status_within_at(
        &self,
        nas_id: Uuid,
        tenant_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<NasVpnStatus, MonitorError> {
        let nas = self
            .store
            .find_nas(nas_id)
            .await?
            .filter(|nas| tenant_id.map_or(true, |t| nas.tenant_id == t))
            .ok_or(MonitorError::NotFound(nas_id))?;

        let samples = self.sample_or_stale(now).await;
        Ok(build_status(&nas, samples.as_deref(), now))
    }

    /// Every monitored NAS of a tenant, all judged against one probe run
    pub async fn status_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<NasVpnStatus>, MonitorError> {
        self.status_for_tenant_at(tenant_id, Utc::now()).await
    }

    pub async fn status_for_tenant_at(
        &self,
        tenant_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<NasVpnStatus>, MonitorError> {
        let rows = self.store.list_monitored_for_tenant(tenant_id).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let samples = self.sample_or_stale(now).await;
        Ok(rows
            .iter()
            .map(|nas| build_status(nas, samples.as_deref(), now))
            .collect())
    }

    async fn sample_or_stale(&self, now: DateTime<Utc>) -> Option<Vec<PeerSample>> {
        match self.sample(now).await {
            Ok(samples) => Some(samples),
            Err(e) => {
                tracing::warn!("VPN probe failed, serving persisted connectivity: {}", e);
                None
            }
        }
    }
}

fn build_status(nas: &Nas, samples: Option<&[PeerSample]>, now: DateTime<Utc>) -> NasVpnStatus {
    let matched = samples.and_then(|samples| match_sample(nas, samples));

    let is_connected = match samples {
        Some(_) => matched.map_or(false, |s| s.is_connected),
        None => nas.status == NasStatus::Online,
    };

    let last_handshake = matched.and_then(|s| s.last_handshake);

    let uptime = if is_connected {
        nas.uptime
            .clone()
            .or_else(|| last_handshake.map(|at| format_elapsed(at, now)))
    } else {
        None
    };

    let offline_duration = if is_connected {
        None
    } else {
        nas.last_seen.map(|at| format_elapsed(at, now))
    };

    NasVpnStatus {
        nas_id: nas.id,
        tenant_id: nas.tenant_id,
        name: nas.name.clone(),
        vpn_ip: nas.vpn_ip.clone(),
        vpn_public_key: nas.vpn_public_key.clone(),
        status: nas.status,
        is_connected,
        live: samples.is_some(),
        last_seen: nas.last_seen,
        last_handshake,
        endpoint: matched.and_then(|s| s.endpoint.clone()),
        rx_bytes: matched.map_or(0, |s| s.rx_bytes),
        tx_bytes: matched.map_or(0, |s| s.tx_bytes),
        uptime,
        offline_duration,
    }
}
