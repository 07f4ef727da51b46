mod common;

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use uuid::Uuid;

use common::{active_tenant, tenant, FailingTenantStore};
use ispmgr_core::authz::{AuthorizationFacade, AuthzError, Identity};
use ispmgr_core::database::{MemoryStore, StoreWrite, TenantStatus};
use ispmgr_core::permissions::catalog::ROUTERS_VIEW;
use ispmgr_core::permissions::Role;
use ispmgr_core::tenant::TenantLifecycleGate;

fn gate(store: &Arc<MemoryStore>) -> TenantLifecycleGate {
    TenantLifecycleGate::new(store.clone())
}

#[tokio::test]
async fn lapsed_trial_is_expired_once() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut t = tenant(TenantStatus::Trial);
    t.trial_ends_at = Some(Utc::now() - Duration::hours(1));
    store.insert_tenant(t.clone()).await;

    let gate = gate(&store);
    match gate.check(t.id).await {
        Err(AuthzError::Denied { reason }) => assert_eq!(reason, "trial expired"),
        other => panic!("expected denial, got {:?}", other.map(|t| t.id)),
    }
    assert_eq!(store.tenant(t.id).await.unwrap().status, TenantStatus::Expired);

    // Once expired, the terminal rule answers and nothing else is written
    match gate.check(t.id).await {
        Err(AuthzError::Denied { reason }) => assert_eq!(reason, "expired"),
        other => panic!("expected denial, got {:?}", other.map(|t| t.id)),
    }
    assert_eq!(store.writes().await, vec![StoreWrite::TenantExpired { id: t.id }]);
    Ok(())
}

#[tokio::test]
async fn failed_expiry_write_still_denies() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut t = tenant(TenantStatus::Trial);
    t.trial_ends_at = Some(Utc::now() - Duration::hours(1));
    store.insert_tenant(t.clone()).await;

    let gate = TenantLifecycleGate::new(Arc::new(FailingTenantStore { inner: store.clone() }));
    match gate.check(t.id).await {
        Err(AuthzError::Denied { reason }) => assert_eq!(reason, "trial expired"),
        other => panic!("expected denial, got {:?}", other.map(|t| t.id)),
    }

    let decision = gate.authenticate(t.id).await;
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("trial expired"));

    // The row was never transitioned
    assert_eq!(store.tenant(t.id).await.unwrap().status, TenantStatus::Trial);
    assert!(store.writes().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn concurrent_checks_write_expiry_once() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut t = tenant(TenantStatus::Trial);
    t.trial_ends_at = Some(Utc::now() - Duration::minutes(5));
    store.insert_tenant(t.clone()).await;

    let gate = gate(&store);
    let (a, b, c) = tokio::join!(
        gate.authenticate(t.id),
        gate.authenticate(t.id),
        gate.check(t.id)
    );

    assert!(!a.allowed && !b.allowed);
    assert!(c.is_err());
    let expiries = store
        .writes()
        .await
        .into_iter()
        .filter(|w| matches!(w, StoreWrite::TenantExpired { .. }))
        .count();
    assert_eq!(expiries, 1);
    Ok(())
}

#[tokio::test]
async fn radius_path_reports_reasons_without_failing() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut suspended = active_tenant();
    suspended.status = TenantStatus::Suspended;
    store.insert_tenant(suspended.clone()).await;

    let gate = gate(&store);

    let decision = gate.authenticate(suspended.id).await;
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("suspended"));

    let missing = gate.authenticate(Uuid::new_v4()).await;
    assert!(!missing.allowed);
    assert_eq!(missing.reason.as_deref(), Some("tenant not found"));
    Ok(())
}

#[tokio::test]
async fn active_subscription_passes_both_paths() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut t = active_tenant();
    t.subscription_ends_at = Some(Utc::now() + Duration::days(30));
    store.insert_tenant(t.clone()).await;

    let gate = gate(&store);
    assert_eq!(gate.check(t.id).await?.id, t.id);
    let decision = gate.authenticate(t.id).await;
    assert!(decision.allowed);
    assert_eq!(decision.reason, None);
    assert!(store.writes().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn trial_without_end_date_is_misconfigured() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let t = tenant(TenantStatus::Trial);
    store.insert_tenant(t.clone()).await;

    let decision = gate(&store).authenticate(t.id).await;
    assert_eq!(decision.reason.as_deref(), Some("trial not configured"));
    Ok(())
}

#[tokio::test]
async fn facade_runs_gate_before_permission() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut t = active_tenant();
    t.status = TenantStatus::Suspended;
    store.insert_tenant(t.clone()).await;

    let facade = AuthorizationFacade::new(gate(&store));

    // A viewer may see routers, but a suspended tenant is refused first
    let viewer = Identity::new(Uuid::new_v4(), Role::Viewer, Some(t.id));
    assert!(matches!(
        facade.authorize(&viewer, ROUTERS_VIEW).await,
        Err(AuthzError::Denied { .. })
    ));

    let platform = Identity::new(Uuid::new_v4(), Role::SuperAdmin, None);
    assert!(facade.authorize(&platform, ROUTERS_VIEW).await?.is_none());

    let orphan = Identity::new(Uuid::new_v4(), Role::Admin, None);
    assert!(matches!(facade.check_tenant(&orphan).await, Err(AuthzError::NoTenant)));
    Ok(())
}
