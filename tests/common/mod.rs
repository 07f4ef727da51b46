#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Notify;
use tower::ServiceExt;
use uuid::Uuid;

use ispmgr_core::app::{router, AppState};
use ispmgr_core::auth::{generate_jwt, Claims};
use ispmgr_core::authz::{AuthorizationFacade, Identity};
use ispmgr_core::database::{
    MemoryStore, Nas, NasStatus, NasStore, StoreError, StoreResult, Tenant, TenantStatus, TenantStore,
};
use ispmgr_core::permissions::Role;
use ispmgr_core::tenant::TenantLifecycleGate;
use ispmgr_core::vpn::{ConnectivityProbe, PeerSample, ProbeError, VpnConnectivityMonitor};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const RADIUS_SECRET: &str = "radius-test-secret";
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(180);

/// Probe whose answer is set by the test; `None` behaves like a missing `wg` binary
#[derive(Default)]
pub struct ScriptedProbe {
    samples: Mutex<Option<Vec<PeerSample>>>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new(samples: Option<Vec<PeerSample>>) -> Arc<Self> {
        Arc::new(Self {
            samples: Mutex::new(samples),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, samples: Option<Vec<PeerSample>>) {
        *self.samples.lock().unwrap() = samples;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectivityProbe for ScriptedProbe {
    async fn probe(&self) -> Result<Vec<PeerSample>, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.samples
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProbeError::ToolUnavailable("wg".to_string()))
    }
}

/// Probe that parks until released, for holding the tick guard
#[derive(Default)]
pub struct ParkedProbe {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl ConnectivityProbe for ParkedProbe {
    async fn probe(&self) -> Result<Vec<PeerSample>, ProbeError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(Vec::new())
    }
}

/// NAS store whose writes for one row always fail
pub struct FailingNasStore {
    pub inner: Arc<MemoryStore>,
    pub fail_id: Uuid,
}

impl FailingNasStore {
    fn guard(&self, id: Uuid) -> StoreResult<()> {
        if id == self.fail_id {
            return Err(StoreError::Decode(format!("write rejected for {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl NasStore for FailingNasStore {
    async fn list_monitored(&self) -> StoreResult<Vec<Nas>> {
        self.inner.list_monitored().await
    }

    async fn list_monitored_for_tenant(&self, tenant_id: Uuid) -> StoreResult<Vec<Nas>> {
        self.inner.list_monitored_for_tenant(tenant_id).await
    }

    async fn find_nas(&self, id: Uuid) -> StoreResult<Option<Nas>> {
        self.inner.find_nas(id).await
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: NasStatus,
        last_seen: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        self.guard(id)?;
        self.inner.set_status(id, status, last_seen).await
    }

    async fn touch_last_seen(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        self.guard(id)?;
        self.inner.touch_last_seen(id, at).await
    }
}

/// Tenant store that reads fine but cannot persist the trial expiry
pub struct FailingTenantStore {
    pub inner: Arc<MemoryStore>,
}

#[async_trait]
impl TenantStore for FailingTenantStore {
    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        self.inner.find_tenant(id).await
    }

    async fn expire_trial(&self, id: Uuid) -> StoreResult<bool> {
        Err(StoreError::Decode(format!("expiry rejected for {}", id)))
    }
}

pub fn peer(public_key: &str, cidr: &str, last_handshake: Option<DateTime<Utc>>) -> PeerSample {
    PeerSample {
        public_key: public_key.to_string(),
        endpoint: Some("198.51.100.20:51820".to_string()),
        allowed_ips: vec![cidr.parse().unwrap()],
        last_handshake,
        rx_bytes: 4096,
        tx_bytes: 8192,
        is_connected: false,
    }
}

pub fn nas(tenant_id: Uuid, name: &str, vpn_ip: &str, public_key: Option<&str>, status: NasStatus) -> Nas {
    Nas {
        id: Uuid::new_v4(),
        tenant_id,
        name: name.to_string(),
        vpn_ip: Some(vpn_ip.to_string()),
        vpn_public_key: public_key.map(str::to_string),
        status,
        last_seen: None,
        uptime: None,
    }
}

pub fn tenant(status: TenantStatus) -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        status,
        is_activated: false,
        trial_ends_at: None,
        subscription_ends_at: None,
    }
}

pub fn active_tenant() -> Tenant {
    Tenant {
        is_activated: true,
        ..tenant(TenantStatus::Active)
    }
}

pub fn monitor(probe: Arc<dyn ConnectivityProbe>, store: Arc<MemoryStore>) -> VpnConnectivityMonitor {
    VpnConnectivityMonitor::new(probe, store, HANDSHAKE_TIMEOUT, Duration::from_secs(5))
}

/// In-process application over a memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new(probe: Arc<dyn ConnectivityProbe>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let facade = Arc::new(AuthorizationFacade::new(TenantLifecycleGate::new(store.clone())));
        let monitor = Arc::new(monitor(probe, store.clone()));
        let state = AppState::new(facade, monitor, JWT_SECRET, RADIUS_SECRET);
        let router = router(state.clone(), false);
        Self { store, state, router }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("router failed")?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response is not JSON")?
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, identity: &Identity) -> Result<(StatusCode, Value)> {
        let request = Request::get(uri)
            .header("authorization", bearer(identity)?)
            .body(Body::empty())?;
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, identity: &Identity) -> Result<(StatusCode, Value)> {
        let request = Request::post(uri)
            .header("authorization", bearer(identity)?)
            .body(Body::empty())?;
        self.send(request).await
    }
}

pub fn bearer(identity: &Identity) -> Result<String> {
    let token = generate_jwt(&Claims::new(identity, 1), JWT_SECRET)?;
    Ok(format!("Bearer {}", token))
}

pub fn operator(role: Role, tenant_id: Uuid) -> Identity {
    Identity::new(Uuid::new_v4(), role, Some(tenant_id))
}
